use super::traits::ConfigSection;
use crate::error::TunegenError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    /// Per-individual probability of being replaced by a mutated elite.
    pub mutation_rate: f64,
    /// Best fitness strictly above this ends the run early.
    pub target_fitness: f64,
    pub report_interval: usize,
    pub seed: Option<u64>,
    pub mutation_weights: MutationWeights,
}

/// Relative weights of the four rhythm mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationWeights {
    pub swap: f64,
    pub split: f64,
    pub merge: f64,
    pub copy_bar: f64,
}

impl Default for MutationWeights {
    fn default() -> Self {
        Self {
            swap: 4.0,
            split: 5.0,
            merge: 4.0,
            copy_bar: 1.0,
        }
    }
}

impl MutationWeights {
    pub fn as_array(&self) -> [f64; 4] {
        [self.swap, self.split, self.merge, self.copy_bar]
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            num_generations: 300,
            mutation_rate: 0.8,
            target_fitness: 1.2,
            report_interval: 30,
            seed: None,
            mutation_weights: MutationWeights::default(),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), TunegenError> {
        if self.population_size == 0 {
            return Err(TunegenError::Configuration(
                "Population size must be at least 1".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(TunegenError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        if self.report_interval == 0 {
            return Err(TunegenError::Configuration(
                "Report interval must be at least 1".to_string()
            ));
        }
        let weights = self.mutation_weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(TunegenError::Configuration(
                "Mutation weights must be finite and non-negative".to_string()
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(TunegenError::Configuration(
                "At least one mutation weight must be positive".to_string()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_mutation_rate() {
        let config = EvolutionConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let config = EvolutionConfig {
            mutation_weights: MutationWeights {
                swap: 0.0,
                split: 0.0,
                merge: 0.0,
                copy_bar: 0.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
