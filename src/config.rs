use crate::classifier::Proximity;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub domain: DomainConfig,
    pub population: PopulationConfig,
    pub infection: InfectionConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub index_agents: Vec<IndexAgentConfig>,
}

/// Bounded domain the agents live in.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// Lower bound of every coordinate.
    pub min_bound: f64,
    /// Upper bound of every coordinate.
    pub max_bound: f64,
    /// Keep agents inside the domain during engine steps.
    #[serde(default)]
    pub bound_space: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationConfig {
    /// Number of randomly placed agents.
    pub n_agents: usize,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfectionConfig {
    /// Planar reference point of the infection source.
    pub reference: [f64; 2],
    /// Agents strictly closer than this to the reference point get infected.
    pub threshold: f64,
    #[serde(default)]
    pub index_policy: IndexPolicy,
}

/// When index agents join the population relative to classification.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolicy {
    /// Registered before classification and classified like any other agent.
    Before,
    /// Registered after classification and never classified.
    #[default]
    After,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Seed of the random number generator (OS entropy if absent).
    #[serde(default)]
    pub seed: Option<u64>,
    /// Capacity of the population store.
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_agents: default_max_agents(),
        }
    }
}

fn default_max_agents() -> usize {
    1_000_000
}

/// Agent placed at a fixed position.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexAgentConfig {
    pub position: [f64; 2],
    #[serde(default = "default_index_infected")]
    pub infected: bool,
}

fn default_index_infected() -> bool {
    true
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.domain.validate().context("invalid domain")?;

        check_num(self.population.n_agents, 1..=100_000)
            .context("invalid number of agents")?;

        Proximity::new(self.infection.reference, self.infection.threshold)
            .context("invalid infection source")?;

        check_num(self.engine.max_agents, 1..).context("invalid store capacity")?;

        for (i_idx, idx_agt) in self.index_agents.iter().enumerate() {
            check_point(&idx_agt.position)
                .with_context(|| format!("invalid position of index agent {i_idx}"))?;
            if self.domain.bound_space {
                let range = self.domain.min_bound..=self.domain.max_bound;
                for &coord in &idx_agt.position {
                    check_num(coord, range.clone()).with_context(|| {
                        format!("index agent {i_idx} lies outside the bounded domain")
                    })?;
                }
            }
        }

        Ok(())
    }
}

impl DomainConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_bound.is_finite() || !self.max_bound.is_finite() {
            bail!(
                "bounds must be finite, but are {:?} and {:?}",
                self.min_bound,
                self.max_bound
            );
        }
        if self.min_bound >= self.max_bound {
            bail!(
                "minimum bound must be less than maximum bound, but {:?} >= {:?}",
                self.min_bound,
                self.max_bound
            );
        }
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_point(point: &[f64]) -> Result<()> {
    if point.iter().any(|coord| !coord.is_finite()) {
        bail!("point must have finite coordinates, but is {point:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
[domain]
min_bound = 0.0
max_bound = 1000.0
bound_space = true

[population]
n_agents = 240

[infection]
reference = [20.0, 50.0]
threshold = 100.0
"#;

    #[test]
    fn parses_minimal_config() {
        let cfg = Config::from_toml(BASE).expect("failed to parse config");
        assert_eq!(cfg.domain.min_bound, 0.0);
        assert_eq!(cfg.domain.max_bound, 1000.0);
        assert!(cfg.domain.bound_space);
        assert_eq!(cfg.population.n_agents, 240);
        assert_eq!(cfg.infection.reference, [20.0, 50.0]);
        assert_eq!(cfg.infection.index_policy, IndexPolicy::After);
        assert_eq!(cfg.engine, EngineConfig::default());
        assert!(cfg.index_agents.is_empty());
    }

    #[test]
    fn parses_index_agents_and_engine() {
        let contents = String::from(BASE)
            + "index_policy = \"before\"\n"
            + "\n"
            + "[engine]\n"
            + "seed = 7\n"
            + "max_agents = 500\n"
            + "\n"
            + "[[index_agents]]\n"
            + "position = [20.0, 50.0]\n"
            + "\n"
            + "[[index_agents]]\n"
            + "position = [30.0, 40.0]\n"
            + "infected = false\n";
        let cfg = Config::from_toml(&contents).expect("failed to parse config");
        assert_eq!(cfg.infection.index_policy, IndexPolicy::Before);
        assert_eq!(cfg.engine.seed, Some(7));
        assert_eq!(cfg.engine.max_agents, 500);
        assert_eq!(cfg.index_agents.len(), 2);
        assert!(cfg.index_agents[0].infected);
        assert!(!cfg.index_agents[1].infected);
    }

    #[test]
    fn rejects_zero_agents() {
        let contents = BASE.replace("n_agents = 240", "n_agents = 0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let contents = BASE.replace("max_bound = 1000.0", "max_bound = -5.0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let contents = BASE.replace("threshold = 100.0", "threshold = 0.0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn threshold_rule_matches_proximity() {
        for threshold in ["1e-310", "2.2250738585072014e-308", "-1.0", "nan", "inf"] {
            let contents = BASE.replace("threshold = 100.0", &format!("threshold = {threshold}"));
            let value: f64 = threshold.parse().unwrap();
            assert_eq!(
                Config::from_toml(&contents).is_ok(),
                Proximity::new([20.0, 50.0], value).is_ok(),
                "threshold {threshold}"
            );
        }
    }

    #[test]
    fn rejects_index_agent_outside_bounded_domain() {
        let contents = String::from(BASE) + "\n[[index_agents]]\nposition = [-20.0, 50.0]\n";
        assert!(Config::from_toml(&contents).is_err());

        let contents = contents.replace("bound_space = true", "bound_space = false");
        assert!(Config::from_toml(&contents).is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        let contents = String::from(BASE) + "\n[output]\nsteps = 1\n";
        assert!(Config::from_toml(&contents).is_err());
    }
}
