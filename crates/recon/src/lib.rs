//! `entrymatch-recon`: customs error-report reconciliation engine.
//!
//! Pure engine crate: parses extracted report text, normalizes decoded
//! spreadsheet tables and joins the two on the composite entry key.
//! No file, PDF or CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod parser;

pub use config::{ReconConfig, UnmatchedPolicy};
pub use engine::run;
pub use error::ReconError;
pub use model::{CellValue, ErrorRecord, ImportSet, OutputTable, RawTable, ReconResult};
pub use normalize::normalize;
pub use parser::{combine, ErrorParser};
