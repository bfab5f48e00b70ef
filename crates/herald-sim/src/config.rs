//! Run configuration.
//!
//! A [`SimulationConfig`] is a plain serde document. Every field has a
//! default, so a JSON file only needs to name what it changes. Nothing is
//! checked while parsing; [`SimulationConfig::validate`] runs when a
//! simulation is built and rejects anything a run could not honour.
//!
//! # Example
//!
//! ```json
//! {
//!   "width": 10.0,
//!   "height": 2.0,
//!   "device_count": 40,
//!   "schedule": { "type": "jittered", "deviation": 0.25 },
//!   "fail_time": 50.0,
//!   "algorithms": [{ "name": "colr", "algorithm": { "type": "color" } }],
//!   "variants": [{ "name": "colr_s4", "algorithm": "colr", "delay": 4 }]
//! }
//! ```

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::path::Path;

use herald_election::Algorithm;
use herald_topology::{DeviceId, Point};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::oracle::GroundTruth;

/// Initial placement of devices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layout {
    /// Uniformly at random inside the arena.
    #[default]
    Random,
    /// One position per device, in id order.
    Explicit { positions: Vec<Point> },
}

/// How rounds are laid out in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Every device runs a round at each integer time.
    #[default]
    Synchronous,
    /// Each device keeps its own clock; periods have unit mean and the
    /// given standard deviation.
    Jittered { deviation: f64 },
}

impl Schedule {
    pub fn is_synchronous(&self) -> bool {
        matches!(self, Self::Synchronous)
    }
}

/// An election strategy under a short name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAlgorithm {
    pub name: String,
    pub algorithm: Algorithm,
}

/// One measured output stream: an algorithm, optionally debounced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    /// Name of the algorithm whose leader is measured
    pub algorithm: String,
    /// Stabiliser delay; `None` measures the raw output
    #[serde(default)]
    pub delay: Option<u32>,
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Arena extent along x
    pub width: f64,
    /// Arena extent along y
    pub height: f64,
    /// Radio range (inclusive)
    pub range: f64,
    pub device_count: usize,
    /// Maximum movement speed; zero keeps devices still
    pub speed: f64,
    pub layout: Layout,
    pub schedule: Schedule,
    pub end_time: f64,
    /// When the natural leader is removed; `None` disables the perturbation
    pub fail_time: Option<f64>,
    pub seed: u64,
    /// Spacing of metric ticks
    pub log_interval: f64,
    pub ground_truth: GroundTruth,
    /// Keep the event timeline in the report
    pub record_events: bool,
    pub algorithms: Vec<NamedAlgorithm>,
    pub variants: Vec<VariantConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::experiment(10.0, 10, 0.0, true)
    }
}

/// Stabiliser delays compared in the benchmark experiment.
pub const EXPERIMENT_DELAYS: [u32; 3] = [2, 4, 8];

impl SimulationConfig {
    /// Benchmark setup over a `hops × 2` strip with mean neighbor count
    /// `density`, comparing every strategy raw and debounced.
    pub fn experiment(density: f64, hops: u32, speed: f64, synchronous: bool) -> Self {
        let hops_f = f64::from(hops);
        let device_count = (density * hops_f * 2.0 / PI).floor().max(1.0) as usize;
        let schedule = if synchronous {
            Schedule::Synchronous
        } else {
            Schedule::Jittered { deviation: 0.25 }
        };

        let algorithms = vec![
            NamedAlgorithm {
                name: "diam".into(),
                algorithm: Algorithm::diameter(hops.saturating_mul(2).max(1)),
            },
            NamedAlgorithm {
                name: "wave".into(),
                algorithm: Algorithm::wave(1, 1),
            },
            NamedAlgorithm {
                name: "wav2".into(),
                algorithm: Algorithm::wave(2, 1),
            },
            NamedAlgorithm {
                name: "wav3".into(),
                algorithm: Algorithm::wave(3, 1),
            },
            NamedAlgorithm {
                name: "colr".into(),
                algorithm: Algorithm::Color,
            },
        ];
        let mut variants = Vec::new();
        for named in &algorithms {
            variants.push(VariantConfig {
                name: format!("{}_s1", named.name),
                algorithm: named.name.clone(),
                delay: None,
            });
        }
        for delay in EXPERIMENT_DELAYS {
            for named in &algorithms {
                variants.push(VariantConfig {
                    name: format!("{}_s{}", named.name, delay),
                    algorithm: named.name.clone(),
                    delay: Some(delay),
                });
            }
        }

        Self {
            width: hops_f,
            height: 2.0,
            range: herald_topology::DEFAULT_RANGE,
            device_count,
            speed,
            layout: Layout::Random,
            schedule,
            end_time: 10.0 * hops_f,
            fail_time: Some(5.0 * hops_f),
            seed: 0,
            log_interval: 1.0,
            ground_truth: GroundTruth::default(),
            record_events: false,
            algorithms,
            variants,
        }
    }

    /// Same configuration with every algorithm measured raw only.
    pub fn raw_only(mut self) -> Self {
        self.variants = self
            .algorithms
            .iter()
            .map(|named| VariantConfig {
                name: named.name.clone(),
                algorithm: named.name.clone(),
                delay: None,
            })
            .collect();
        self
    }

    /// Parse a JSON document.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Arena corners.
    pub fn bounds(&self) -> (Point, Point) {
        (Point::ORIGIN, Point::new(self.width, self.height))
    }

    /// Reject anything a run could not honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("range", self.range),
            ("end_time", self.end_time),
            ("log_interval", self.log_interval),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }
        if self.device_count == 0 {
            return Err(ConfigError::NoDevices);
        }
        if let Layout::Explicit { positions } = &self.layout {
            if positions.len() != self.device_count {
                return Err(ConfigError::LayoutMismatch {
                    expected: self.device_count,
                    found: positions.len(),
                });
            }
            if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
                return Err(ConfigError::NonFinitePosition(DeviceId(i as u64)));
            }
        }
        if let Schedule::Jittered { deviation } = self.schedule {
            if !(0.0..1.0).contains(&deviation) {
                return Err(ConfigError::InvalidDeviation(deviation));
            }
        }
        if let Some(fail_time) = self.fail_time {
            if !(fail_time.is_finite() && fail_time >= 0.0) {
                return Err(ConfigError::InvalidFailTime(fail_time));
            }
        }

        let mut names = BTreeSet::new();
        for named in &self.algorithms {
            if named.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !names.insert(named.name.as_str()) {
                return Err(ConfigError::DuplicateAlgorithm(named.name.clone()));
            }
            named
                .algorithm
                .validate()
                .map_err(|source| ConfigError::Algorithm {
                    name: named.name.clone(),
                    source,
                })?;
        }

        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        let mut variants = BTreeSet::new();
        for variant in &self.variants {
            if variant.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !variants.insert(variant.name.as_str()) {
                return Err(ConfigError::DuplicateVariant(variant.name.clone()));
            }
            if !names.contains(variant.algorithm.as_str()) {
                return Err(ConfigError::UnknownAlgorithm {
                    variant: variant.name.clone(),
                    algorithm: variant.algorithm.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_election::ElectionError;

    #[test]
    fn experiment_matches_benchmark_formulas() {
        let config = SimulationConfig::experiment(10.0, 20, 0.5, false);
        assert_eq!(config.device_count, 127);
        assert_eq!(config.end_time, 200.0);
        assert_eq!(config.fail_time, Some(100.0));
        assert_eq!(config.schedule, Schedule::Jittered { deviation: 0.25 });
        assert_eq!(config.algorithms.len(), 5);
        assert_eq!(config.variants.len(), 20);
        assert!(config.variants.iter().any(|v| v.name == "colr_s1" && v.delay.is_none()));
        assert!(config.variants.iter().any(|v| v.name == "wav2_s8" && v.delay == Some(8)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = SimulationConfig::parse(r#"{ "device_count": 5, "seed": 7 }"#).unwrap();
        assert_eq!(config.device_count, 5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.schedule, Schedule::Synchronous);
        assert!(!config.variants.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tagged_sections_parse() {
        let config = SimulationConfig::parse(
            r#"{
                "device_count": 2,
                "layout": { "type": "explicit", "positions": [{ "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }] },
                "schedule": { "type": "jittered", "deviation": 0.1 },
                "ground_truth": "perturbation_flag",
                "algorithms": [{ "name": "d", "algorithm": { "type": "diameter", "bound": 3 } }],
                "variants": [{ "name": "d_s2", "algorithm": "d", "delay": 2 }]
            }"#,
        )
        .unwrap();
        assert!(matches!(config.layout, Layout::Explicit { ref positions } if positions.len() == 2));
        assert_eq!(config.ground_truth, GroundTruth::PerturbationFlag);
        assert_eq!(config.algorithms[0].algorithm, Algorithm::diameter(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            SimulationConfig::parse("{ nope"),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let base = SimulationConfig::default();

        let mut c = base.clone();
        c.range = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::NotPositive { field: "range", .. })));

        let mut c = base.clone();
        c.speed = -1.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidSpeed(_))));

        let mut c = base.clone();
        c.device_count = 0;
        assert!(matches!(c.validate(), Err(ConfigError::NoDevices)));

        let mut c = base.clone();
        c.layout = Layout::Explicit { positions: vec![Point::ORIGIN] };
        assert!(matches!(c.validate(), Err(ConfigError::LayoutMismatch { .. })));

        let mut c = base.clone();
        c.schedule = Schedule::Jittered { deviation: 1.5 };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidDeviation(_))));

        let mut c = base.clone();
        c.fail_time = Some(f64::NAN);
        assert!(matches!(c.validate(), Err(ConfigError::InvalidFailTime(_))));

        let mut c = base.clone();
        c.variants.clear();
        assert!(matches!(c.validate(), Err(ConfigError::NoVariants)));
    }

    #[test]
    fn validation_checks_names() {
        let base = SimulationConfig::default();

        let mut c = base.clone();
        c.algorithms.push(c.algorithms[0].clone());
        assert!(matches!(c.validate(), Err(ConfigError::DuplicateAlgorithm(_))));

        let mut c = base.clone();
        c.variants.push(c.variants[0].clone());
        assert!(matches!(c.validate(), Err(ConfigError::DuplicateVariant(_))));

        let mut c = base.clone();
        c.variants[0].algorithm = "missing".into();
        assert!(matches!(c.validate(), Err(ConfigError::UnknownAlgorithm { .. })));

        let mut c = base.clone();
        c.algorithms[0].algorithm = Algorithm::diameter(0);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Algorithm { source: ElectionError::ZeroDiameterBound, .. })
        ));
    }

    #[test]
    fn raw_only_keeps_one_variant_per_algorithm() {
        let config = SimulationConfig::default().raw_only();
        assert_eq!(config.variants.len(), config.algorithms.len());
        assert!(config.variants.iter().all(|v| v.delay.is_none()));
        assert!(config.validate().is_ok());
    }
}
