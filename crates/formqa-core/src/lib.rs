//! FormQA Core - Domain models, spreadsheet I/O, and configuration
//!
//! This crate contains the domain types shared by every FormQA crate: row
//! documents, the extracted form record, the layered configuration, and the
//! spreadsheet reader/exporter.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod processing;

pub use error::{FormqaError, Result};
