use crate::classifier::{Proximity, classify};
use crate::config::{Config, IndexAgentConfig, IndexPolicy};
use crate::engine::{Engine, PopulationStore, Scheduler};
use crate::generator::generate_population;
use crate::model::{Agent, AgentId};
use anyhow::{Context, Result};

/// Number of engine steps delegated per run.
const N_STEPS: usize = 1;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct Summary {
    /// Number of registered agents after seeding.
    pub n_agents: usize,
    /// Agents classified infected by proximity.
    pub infected: Vec<AgentId>,
}

pub struct Driver {
    cfg: Config,
    engine: Engine,
}

impl Driver {
    /// Construct the engine for a validated configuration.
    ///
    /// `engine_args` are handed to the engine untouched.
    pub fn new(cfg: Config, engine_args: Vec<String>) -> Result<Self> {
        let engine =
            Engine::new(cfg.domain, &cfg.engine, engine_args).context("failed to construct engine")?;
        Ok(Self { cfg, engine })
    }

    #[cfg(test)]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Seed and classify the population, then advance the engine one step.
    pub fn run(&mut self) -> Result<Summary> {
        log::debug!("engine args: {:?}", self.engine.args());

        let summary = self.seed().context("failed to seed population")?;

        self.engine.advance(N_STEPS)?;

        log::info!(
            "simulation completed successfully after {} step(s)",
            self.engine.step()
        );
        Ok(summary)
    }

    fn seed(&mut self) -> Result<Summary> {
        let proximity = Proximity::new(self.cfg.infection.reference, self.cfg.infection.threshold)
            .context("invalid infection source")?;

        let (random, population) = self.engine.seeding_mut();
        generate_population(
            self.cfg.population.n_agents,
            &self.cfg.domain,
            random,
            population,
        )
        .context("failed to generate population")?;
        log::info!("generated {} agents", population.len());

        let policy = self.cfg.infection.index_policy;
        if policy == IndexPolicy::Before {
            self.place_index_agents()
                .context("failed to place index agents")?;
        }

        let population = self.engine.population_mut();
        let n_agt = population.len();
        let infected =
            classify(population, &proximity, 0..n_agt).context("failed to classify population")?;
        log::info!("classified {} of {n_agt} agents infected", infected.len());

        if policy == IndexPolicy::After {
            self.place_index_agents()
                .context("failed to place index agents")?;
        }

        let population = self.engine.population();
        let infected_all: Vec<_> = population
            .agents()
            .iter()
            .filter(|agt| agt.infected())
            .filter_map(Agent::id)
            .collect();
        log::info!("{} of {} agents infected", infected_all.len(), population.len());
        log::debug!("infected agents: {infected_all:?}");

        Ok(Summary {
            n_agents: population.len(),
            infected,
        })
    }

    fn place_index_agents(&mut self) -> Result<()> {
        let population = self.engine.population_mut();
        for (i_idx, IndexAgentConfig { position, infected }) in
            self.cfg.index_agents.iter().enumerate()
        {
            let mut agt = Agent::new([position[0], position[1], 0.0]);
            agt.set_infected(*infected);
            let id = population
                .register(agt)
                .with_context(|| format!("failed to register index agent {i_idx}"))?;

            let agt = population
                .get(id)
                .with_context(|| format!("index agent {id} is not registered"))?;
            log::info!(
                "placed index agent {id} at {:?} (diameter {}, color {})",
                agt.position(),
                agt.diameter(),
                agt.color()
            );
        }
        Ok(())
    }
}
