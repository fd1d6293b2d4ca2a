//! Agent data types.

use anyhow::{Result, bail};
use std::fmt;

/// Diameter of newly created agents.
pub const DEFAULT_DIAMETER: f64 = 7.5;

/// Color code of infected agents.
pub const COLOR_INFECTED: i32 = 4;
/// Color code of healthy agents.
pub const COLOR_HEALTHY: i32 = 0;

/// Stable identity assigned by a population store at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent of the simulation.
///
/// The color code is derived from the infection flag and can only change
/// through [`Agent::set_infected`].
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: Option<AgentId>,
    position: [f64; 3],
    diameter: f64,
    infected: bool,
    color: i32,
}

impl Agent {
    /// Create a new healthy agent at a given position.
    pub fn new(position: [f64; 3]) -> Self {
        Self {
            id: None,
            position,
            diameter: DEFAULT_DIAMETER,
            infected: false,
            color: COLOR_HEALTHY,
        }
    }

    /// Create the daughter of a dividing agent.
    ///
    /// The daughter inherits the infection state, color and diameter of its
    /// mother and has no identity until it is registered.
    #[allow(dead_code)]
    pub fn divide(&self, position: [f64; 3]) -> Self {
        Self {
            id: None,
            position,
            diameter: self.diameter,
            infected: self.infected,
            color: self.color,
        }
    }

    pub fn set_infected(&mut self, infected: bool) {
        self.infected = infected;
        self.color = if infected {
            COLOR_INFECTED
        } else {
            COLOR_HEALTHY
        };
    }

    pub fn infected(&self) -> bool {
        self.infected
    }

    pub fn color(&self) -> i32 {
        self.color
    }

    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Get the identity of the agent, if it has been registered.
    pub fn id(&self) -> Option<AgentId> {
        self.id
    }

    /// Assign the store identity.
    ///
    /// # Errors
    /// Returns an error if the agent already has an identity.
    pub(crate) fn assign_id(&mut self, id: AgentId) -> Result<()> {
        if let Some(old_id) = self.id {
            bail!("agent {old_id} is already registered");
        }
        self.id = Some(id);
        Ok(())
    }

    pub(crate) fn position_mut(&mut self) -> &mut [f64; 3] {
        &mut self.position
    }
}
