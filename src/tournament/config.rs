//! Run configuration for a tournament.

use serde::{Deserialize, Serialize};

use crate::bradley_terry;

use super::error::TournamentError;

/// Largest competitor set a run accepts. A full tournament plans
/// n·(n−1) judgments per attribute, so cost grows quadratically.
pub const MAX_COMPETITORS: usize = 24;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_CONCURRENCY: usize = 32;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Everything needed to run one tournament.
///
/// Deserializes from JSON (or any serde format); only `competitors`,
/// `attributes` and `label` are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub competitors: Vec<String>,
    /// Repeating an attribute repeats every judgment for it.
    pub attributes: Vec<String>,
    /// Plural noun for the competitors, used in the judge prompt.
    pub label: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Max judgments in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub estimator: bradley_terry::Config,
}

impl TournamentConfig {
    pub fn new(
        competitors: impl IntoIterator<Item = impl Into<String>>,
        attributes: impl IntoIterator<Item = impl Into<String>>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            competitors: competitors.into_iter().map(Into::into).collect(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            label: label.into(),
            model: default_model(),
            concurrency: default_concurrency(),
            estimator: bradley_terry::Config::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        let n = self.competitors.len();
        if n < 2 {
            return Err(TournamentError::InvalidInput(
                "at least two competitors must be provided".into(),
            ));
        }
        if n > MAX_COMPETITORS {
            return Err(TournamentError::InvalidInput(format!(
                "no more than {MAX_COMPETITORS} competitors can be provided, got {n}"
            )));
        }
        let mut seen = std::collections::HashSet::with_capacity(n);
        if let Some(dup) = self.competitors.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(TournamentError::InvalidInput(format!(
                "duplicate competitor '{dup}'"
            )));
        }
        if self.attributes.is_empty() {
            return Err(TournamentError::InvalidInput(
                "at least one attribute must be provided".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(TournamentError::InvalidInput(
                "concurrency must be >= 1".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(TournamentError::InvalidInput("model must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let cfg: TournamentConfig = serde_json::from_str(
            r#"{"competitors": ["a", "b"], "attributes": ["taste"], "label": "fruits"}"#,
        )
        .unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.estimator.max_step, 10.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn estimator_overrides_are_partial() {
        let cfg: TournamentConfig = serde_json::from_str(
            r#"{"competitors": ["a", "b"], "attributes": ["q"], "label": "x",
                "estimator": {"max_iterations": 7}}"#,
        )
        .unwrap();
        assert_eq!(cfg.estimator.max_iterations, Some(7));
        assert_eq!(cfg.estimator.gradient_tolerance, 1e-6);
    }

    #[test]
    fn validate_enforces_bounds() {
        let ok = TournamentConfig::new(["a", "b"], ["q"], "x");
        assert!(ok.validate().is_ok());

        let too_few = TournamentConfig::new(["a"], ["q"], "x");
        assert!(too_few.validate().is_err());

        let names: Vec<String> = (0..=MAX_COMPETITORS).map(|i| format!("c{i}")).collect();
        let too_many = TournamentConfig::new(names, ["q"], "x");
        assert!(too_many.validate().is_err());

        let dup = TournamentConfig::new(["a", "a"], ["q"], "x");
        assert!(dup.validate().is_err());

        let none: [&str; 0] = [];
        assert!(TournamentConfig::new(["a", "b"], none, "x").validate().is_err());
        assert!(ok.clone().with_concurrency(0).validate().is_err());
        assert!(ok.with_model(" ").validate().is_err());
    }
}
