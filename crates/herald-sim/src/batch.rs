//! Repeated runs over consecutive seeds.

use tracing::info;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::events::leader_changes;
use crate::metrics::{BatchSummary, RunReport};
use crate::simulation::Simulation;

/// Reports of every run plus their merge.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub reports: Vec<RunReport>,
    pub summary: BatchSummary,
}

/// End-of-run digest of one variant across a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOutcome {
    pub variant: String,
    /// Mean share of correct devices at each run's last tick
    pub final_correct: f64,
    /// Output changes over all runs (zero unless events were recorded)
    pub leader_changes: usize,
}

impl Batch {
    /// One digest per measured variant, in name order.
    pub fn outcomes(&self) -> Vec<VariantOutcome> {
        self.summary
            .series
            .keys()
            .map(|variant| {
                let finals: Vec<f64> = self
                    .reports
                    .iter()
                    .filter_map(|r| r.last(variant))
                    .map(|t| t.correct_ratio())
                    .collect();
                let final_correct = if finals.is_empty() {
                    0.0
                } else {
                    finals.iter().sum::<f64>() / finals.len() as f64
                };
                VariantOutcome {
                    variant: variant.clone(),
                    final_correct,
                    leader_changes: self
                        .reports
                        .iter()
                        .map(|r| leader_changes(&r.events, variant).count())
                        .sum(),
                }
            })
            .collect()
    }
}

/// Run `config` with seeds `config.seed .. config.seed + runs`.
///
/// The configuration is validated once up front, so either every run
/// happens or none does.
pub fn run_batch(config: &SimulationConfig, runs: usize) -> Result<Batch> {
    config.validate()?;
    let mut batch = Batch::default();
    for i in 0..runs {
        let seeded = SimulationConfig {
            seed: config.seed.wrapping_add(i as u64),
            ..config.clone()
        };
        let report = Simulation::new(seeded)?.run();
        batch.summary.merge(&report);
        batch.reports.push(report);
    }
    info!(runs, "batch finished");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        let mut config = SimulationConfig::experiment(8.0, 4, 0.0, true).raw_only();
        config.end_time = 12.0;
        config.fail_time = Some(6.0);
        config
    }

    #[test]
    fn seeds_are_consecutive() {
        let mut config = small();
        config.seed = 40;
        let batch = run_batch(&config, 3).unwrap();
        assert_eq!(batch.summary.seeds, vec![40, 41, 42]);
        assert_eq!(batch.reports.len(), 3);
        let ticks = batch.summary.series("colr").unwrap();
        assert_eq!(ticks.len(), 13);
        assert!(ticks.iter().all(|t| t.runs == 3));
    }

    #[test]
    fn outcomes_digest_each_variant() {
        let mut config = small();
        config.record_events = true;
        let batch = run_batch(&config, 2).unwrap();
        let outcomes = batch.outcomes();
        assert_eq!(outcomes.len(), config.variants.len());
        let colr = outcomes.iter().find(|o| o.variant == "colr").unwrap();
        assert!((0.0..=1.0).contains(&colr.final_correct));
        // devices start as their own leaders, so someone must switch
        assert!(colr.leader_changes > 0);

        config.record_events = false;
        let quiet = run_batch(&config, 1).unwrap();
        assert!(quiet.outcomes().iter().all(|o| o.leader_changes == 0));
    }

    #[test]
    fn invalid_config_runs_nothing() {
        let mut config = small();
        config.end_time = -1.0;
        assert!(run_batch(&config, 2).is_err());
    }
}
