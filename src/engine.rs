use crate::config::{DomainConfig, EngineConfig};
use crate::model::{Agent, AgentId};
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;

/// Indexed collection of registered agents.
pub trait PopulationStore {
    /// Take ownership of an unregistered agent and assign its identity.
    fn register(&mut self, agent: Agent) -> Result<AgentId>;

    fn get(&self, id: AgentId) -> Option<&Agent>;

    fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent>;

    fn len(&self) -> usize;

    /// Drop every agent registered after the first `len` ones.
    fn truncate(&mut self, len: usize);
}

/// Source of uniformly distributed numbers.
pub trait UniformSource {
    /// Draw a number from the closed interval `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> Result<f64>;
}

pub trait Scheduler {
    fn advance(&mut self, n_steps: usize) -> Result<()>;
}

/// Per-step agent behavior run by the engine.
pub trait Behavior {
    /// Update one agent, optionally returning a daughter to register.
    fn run(&self, _agent: &mut Agent) -> Result<Option<Agent>> {
        Ok(None)
    }
}

/// Behavior that leaves agents untouched.
pub struct NoOp;

impl Behavior for NoOp {}

/// Agents owned by the engine, indexed by identity.
pub struct Population {
    agt_vec: Vec<Agent>,
    max_agents: usize,
}

impl Population {
    pub fn with_capacity(max_agents: usize) -> Self {
        Self {
            agt_vec: Vec::new(),
            max_agents,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agt_vec
    }

    fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agt_vec
    }
}

impl PopulationStore for Population {
    fn register(&mut self, mut agent: Agent) -> Result<AgentId> {
        if self.agt_vec.len() >= self.max_agents {
            bail!("population store is full ({} agents)", self.max_agents);
        }
        let id = AgentId(self.agt_vec.len());
        agent.assign_id(id)?;
        self.agt_vec.push(agent);
        Ok(id)
    }

    fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agt_vec.get(id.0)
    }

    fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agt_vec.get_mut(id.0)
    }

    fn len(&self) -> usize {
        self.agt_vec.len()
    }

    fn truncate(&mut self, len: usize) {
        self.agt_vec.truncate(len);
    }
}

/// Random number generator of the engine.
pub struct Random {
    rng: ChaCha12Rng,
}

impl Random {
    /// Seed deterministically, or from OS entropy if no seed is given.
    pub fn new(seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };
        Ok(Self { rng })
    }
}

impl UniformSource for Random {
    fn uniform(&mut self, low: f64, high: f64) -> Result<f64> {
        let dist = Uniform::new_inclusive(low, high)
            .with_context(|| format!("invalid uniform interval [{low}, {high}]"))?;
        Ok(dist.sample(&mut self.rng))
    }
}

/// Simulation engine.
///
/// Holds the domain, the population, and the random number generator,
/// and advances the population through discrete time steps.
pub struct Engine {
    domain: DomainConfig,
    population: Population,
    random: Random,
    args: Vec<String>,
    behaviors: Vec<Box<dyn Behavior>>,
    step: usize,
}

impl Engine {
    /// Create a new `Engine` with an empty population.
    ///
    /// `args` are kept as given and never interpreted.
    pub fn new(domain: DomainConfig, cfg: &EngineConfig, args: Vec<String>) -> Result<Self> {
        domain.validate().context("invalid domain")?;
        let random = Random::new(cfg.seed).context("failed to construct random")?;

        Ok(Self {
            domain,
            population: Population::with_capacity(cfg.max_agents),
            random,
            args,
            behaviors: vec![Box::new(NoOp)],
            step: 0,
        })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of steps performed so far.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    /// Borrow the random source and the population at the same time.
    pub fn seeding_mut(&mut self) -> (&mut Random, &mut Population) {
        (&mut self.random, &mut self.population)
    }

    /// Replace the per-step behaviors.
    #[allow(dead_code)]
    pub fn set_behaviors(&mut self, behaviors: Vec<Box<dyn Behavior>>) {
        self.behaviors = behaviors;
    }

    fn perform_step(&mut self) -> Result<()> {
        let mut daughters = Vec::new();
        for agt in self.population.agents_mut() {
            for behavior in &self.behaviors {
                if let Some(daughter) = behavior.run(agt)? {
                    daughters.push(daughter);
                }
            }
        }

        let n_agt = self.population.len();
        for (i_dtr, daughter) in daughters.into_iter().enumerate() {
            if let Err(error) = self.population.register(daughter) {
                self.population.truncate(n_agt);
                return Err(error).with_context(|| format!("failed to register daughter {i_dtr}"));
            }
        }

        if self.domain.bound_space {
            let (min, max) = (self.domain.min_bound, self.domain.max_bound);
            for agt in self.population.agents_mut() {
                for coord in agt.position_mut() {
                    *coord = coord.clamp(min, max);
                }
            }
        }

        self.step += 1;
        Ok(())
    }
}

impl Scheduler for Engine {
    fn advance(&mut self, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.perform_step()
                .with_context(|| format!("failed to perform step {}", self.step))?;
            log::debug!("completed step {}", self.step);
        }
        Ok(())
    }
}
