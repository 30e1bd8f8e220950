//! Column frequency analysis with an undoable edit history.
//!
//! [`analysis::analyze`] turns rows into a sorted frequency table and
//! [`history::EditHistory`] tracks category deletions over it. The remaining
//! modules load data, render and export tables, and drive an interactive
//! session around a single-owner [`workspace::Workspace`].

pub mod analysis;
pub mod charts;
pub mod cli_output;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod session;
pub mod workspace;

pub use analysis::analyze;
pub use history::EditHistory;
pub use models::{AnalysisResult, FrequencyItem, Row};
pub use workspace::{Transform, Workspace};
