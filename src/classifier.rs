use crate::engine::PopulationStore;
use crate::model::AgentId;
use anyhow::{Context, Result, bail};
use std::ops::Range;

/// Smallest accepted distance threshold.
pub const MIN_THRESHOLD: f64 = f64::MIN_POSITIVE;

/// Infection source: a planar reference point and a distance threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    reference: [f64; 2],
    threshold: f64,
}

impl Proximity {
    pub fn new(reference: [f64; 2], threshold: f64) -> Result<Self> {
        if reference.iter().any(|coord| !coord.is_finite()) {
            bail!("reference point must be finite, but is {reference:?}");
        }
        if !(MIN_THRESHOLD..f64::INFINITY).contains(&threshold) {
            bail!(
                "threshold must be in the range {:?}, but is {threshold:?}",
                MIN_THRESHOLD..f64::INFINITY
            );
        }
        Ok(Self {
            reference,
            threshold,
        })
    }

    /// Planar Euclidean distance from the reference point.
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        let dx = self.reference[0] - x;
        let dy = self.reference[1] - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether a point lies strictly within the threshold.
    pub fn within(&self, x: f64, y: f64) -> bool {
        self.distance(x, y) < self.threshold
    }
}

/// Infect every agent in `range` that lies within `proximity`.
///
/// Returns the identities of the agents classified infected, in order.
/// Agents outside the threshold are left as they are.
pub fn classify<S>(
    store: &mut S,
    proximity: &Proximity,
    range: Range<usize>,
) -> Result<Vec<AgentId>>
where
    S: PopulationStore + ?Sized,
{
    let n_agt = store.len();
    if range.start > range.end || range.end > n_agt {
        bail!("identity range {range:?} is not within the population of {n_agt} agents");
    }

    let mut infected = Vec::new();
    for idx in range {
        let id = AgentId(idx);
        let agt = store
            .get_mut(id)
            .with_context(|| format!("agent {id} is not registered"))?;

        let [x, y, _] = agt.position();
        if proximity.within(x, y) {
            agt.set_infected(true);
            log::info!("agent {id} infected");
            infected.push(id);
        }
    }

    Ok(infected)
}
