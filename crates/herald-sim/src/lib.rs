//! Herald Election Simulator
//!
//! Runs populations of mobile devices through several self-stabilising
//! elections at once and measures how well each one tracks the expected
//! leader, before and after the natural leader is removed.
//!
//! # Architecture
//!
//! - **Field**: device arena, published states, unit-disk reachability
//! - **Agenda**: discrete-event queue of spawns, rounds, failures and ticks
//! - **Mobility**: rectangle walk inside the arena
//! - **Oracle**: scripted failure and the expected leader
//! - **Metrics**: distinct leaders, correct and spurious outputs per tick
//!
//! # Usage
//!
//! ```ignore
//! let config = SimulationConfig::experiment(10.0, 20, 0.25, false);
//! let report = Simulation::new(config)?.run();
//! println!("{:?}", report.last("colr_s4"));
//! ```

mod batch;
mod config;
mod error;
mod events;
mod metrics;
mod mobility;
mod oracle;
mod schedule;
mod simulation;
mod substrate;

pub use batch::{run_batch, Batch, VariantOutcome};
pub use config::{
    Layout, NamedAlgorithm, Schedule, SimulationConfig, VariantConfig, EXPERIMENT_DELAYS,
};
pub use error::{ConfigError, Error, Result};
pub use events::{leader_changes, SimEvent};
pub use metrics::{Aggregator, BatchSummary, Record, RunReport, TickStats, TickSummary};
pub use mobility::{random_point, RectangleWalk};
pub use oracle::{GroundTruth, Perturbation};
pub use schedule::{Agenda, Task, MIN_PERIOD};
pub use simulation::{Simulation, Variant};
pub use substrate::{Device, Field};
