// File I/O operations

pub mod error;
pub mod export;
pub mod files;
pub mod pdf;
pub mod spreadsheet;

pub use error::IoError;
pub use pdf::{Pdftotext, TextExtractor};
