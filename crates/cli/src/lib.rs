//! `entrymatch-cli` library half: the upload/process service and the exit
//! code registry shared with the `entrymatch` binary.

pub mod exit_codes;
pub mod service;

pub use service::{Service, ServiceError, SessionStore, Upload};
