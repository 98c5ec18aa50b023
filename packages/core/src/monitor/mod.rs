//! Website Monitoring Module
//!
//! The check-and-alert cycle: probing, status classification, alert
//! rendering and the dispatch decision.

pub mod classifier;
pub mod cycle;
pub mod probe;
pub mod template;
pub mod types;

pub use classifier::classify;
pub use cycle::CycleRunner;
pub use probe::Prober;
pub use template::{EmailTemplate, TemplateError};
pub use types::*;
