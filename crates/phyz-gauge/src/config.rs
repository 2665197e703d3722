//! Serializable simulation configuration.

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::error::{GaugeError, Result};
use crate::field::{GaugeField, InitPolicy};
use crate::group::FiniteGroup;
use crate::metropolis::AcceptanceRule;

/// Gauge group selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupSpec {
    /// Z_N.
    Cyclic { n: usize },
    /// Klein four-group.
    Klein,
    /// Quaternion group Q_8.
    Quaternion,
    /// Explicit multiplication table, optionally with element names.
    Table {
        table: Vec<Vec<usize>>,
        #[serde(default)]
        names: Option<Vec<String>>,
    },
}

impl GroupSpec {
    /// Build and validate the group.
    pub fn build(&self) -> Result<FiniteGroup> {
        match self {
            GroupSpec::Cyclic { n } => FiniteGroup::cyclic(*n),
            GroupSpec::Klein => Ok(FiniteGroup::klein()),
            GroupSpec::Quaternion => Ok(FiniteGroup::quaternion()),
            GroupSpec::Table { table, names } => {
                let group = FiniteGroup::new(table.clone())?;
                match names {
                    Some(names) => group.with_names(names.clone()),
                    None => Ok(group),
                }
            }
        }
    }
}

/// Everything needed to construct a seeded [`GaugeField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lattice extent along each axis.
    pub shape: Vec<usize>,
    pub group: GroupSpec,
    #[serde(default = "default_action")]
    pub action: ActionKind,
    /// Initial inverse temperature.
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_init")]
    pub init: InitPolicy,
    #[serde(default)]
    pub acceptance: AcceptanceRule,
    /// Seed for the field's random source.
    #[serde(default)]
    pub seed: u64,
}

fn default_action() -> ActionKind {
    ActionKind::Delta
}

fn default_beta() -> f64 {
    1.0
}

fn default_init() -> InitPolicy {
    InitPolicy::Identity
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shape: vec![4, 4, 4],
            group: GroupSpec::Cyclic { n: 2 },
            action: default_action(),
            beta: default_beta(),
            init: default_init(),
            acceptance: AcceptanceRule::default(),
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check parameters that do not need the group or lattice to be built.
    pub fn validate(&self) -> Result<()> {
        if !self.beta.is_finite() {
            return Err(GaugeError::InvalidParameter(format!(
                "beta must be finite, got {}",
                self.beta
            )));
        }
        Ok(())
    }

    /// Build the group, the lattice and the initialized field.
    pub fn build(&self) -> Result<GaugeField> {
        self.validate()?;
        let group = self.group.build()?;
        let mut field =
            GaugeField::seeded(&self.shape, group, self.action, self.beta, self.init, self.seed)?;
        field.set_acceptance(self.acceptance);
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{
            "shape": [2, 2, 2],
            "group": { "kind": "cyclic", "n": 3 }
        }"#;
        let config = SimulationConfig::from_json(json).unwrap();
        assert_eq!(config.action, ActionKind::Delta);
        assert_eq!(config.init, InitPolicy::Identity);
        assert_eq!(config.acceptance, AcceptanceRule::Metropolis);

        let field = config.build().unwrap();
        assert_eq!(field.group().size(), 3);
        assert_eq!(field.lattice().n_links(), 24);
        assert_eq!(field.total_energy(), 0.0);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "shape": [3, 3],
            "group": { "kind": "table", "table": [[0, 1], [1, 0]], "names": ["+", "-"] },
            "action": "u1_cosine",
            "beta": 0.5,
            "init": { "half_random": { "fixed": 1 } },
            "acceptance": "always",
            "seed": 12
        }"#;
        let config = SimulationConfig::from_json(json).unwrap();
        let field = config.build().unwrap();
        assert_eq!(field.group().element_by_name("-"), Some(1));
        assert_eq!(field.beta(), 0.5);
        assert_eq!(field.acceptance(), AcceptanceRule::Always);
    }

    #[test]
    fn test_round_trip_json() {
        let config = SimulationConfig {
            group: GroupSpec::Quaternion,
            init: InitPolicy::Fixed(3),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs() {
        let bad_table = r#"{ "shape": [2, 2], "group": { "kind": "table", "table": [[0, 1], [0, 1]] } }"#;
        let config = SimulationConfig::from_json(bad_table).unwrap();
        assert!(matches!(config.build(), Err(GaugeError::InvalidGroup(_))));

        let bad_shape = r#"{ "shape": [5], "group": { "kind": "klein" } }"#;
        let config = SimulationConfig::from_json(bad_shape).unwrap();
        assert!(matches!(config.build(), Err(GaugeError::InvalidShape(_))));

        let bad_init = r#"{ "shape": [2, 2], "group": { "kind": "klein" }, "init": { "fixed": 4 } }"#;
        let config = SimulationConfig::from_json(bad_init).unwrap();
        assert!(matches!(
            config.build(),
            Err(GaugeError::ElementOutOfRange { element: 4, size: 4 })
        ));

        assert!(matches!(
            SimulationConfig::from_json("{ not json"),
            Err(GaugeError::Json(_))
        ));
    }
}
