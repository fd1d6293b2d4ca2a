use crate::config::DomainConfig;
use crate::engine::{PopulationStore, UniformSource};
use crate::model::{Agent, AgentId};
use anyhow::{Context, Result, bail};

/// Place `n_agt` healthy agents uniformly at random in the planar domain.
///
/// Each agent is registered right after it is created. Either all agents
/// end up registered or, on error, the store is restored to its prior size.
pub fn generate_population<R, S>(
    n_agt: usize,
    domain: &DomainConfig,
    source: &mut R,
    store: &mut S,
) -> Result<Vec<AgentId>>
where
    R: UniformSource + ?Sized,
    S: PopulationStore + ?Sized,
{
    if n_agt == 0 {
        bail!("number of agents must be positive");
    }

    let len_before = store.len();
    let result = register_agents(n_agt, domain, source, store);
    if result.is_err() {
        store.truncate(len_before);
        log::warn!("rolled back population to {len_before} agents");
    }
    result
}

fn register_agents<R, S>(
    n_agt: usize,
    domain: &DomainConfig,
    source: &mut R,
    store: &mut S,
) -> Result<Vec<AgentId>>
where
    R: UniformSource + ?Sized,
    S: PopulationStore + ?Sized,
{
    let mut id_vec = Vec::with_capacity(n_agt);
    for i_agt in 0..n_agt {
        let x = source
            .uniform(domain.min_bound, domain.max_bound)
            .with_context(|| format!("failed to draw x coordinate of agent {i_agt}"))?;
        let y = source
            .uniform(domain.min_bound, domain.max_bound)
            .with_context(|| format!("failed to draw y coordinate of agent {i_agt}"))?;

        let id = store
            .register(Agent::new([x, y, 0.0]))
            .with_context(|| format!("failed to register agent {i_agt}"))?;
        id_vec.push(id);
    }
    Ok(id_vec)
}
