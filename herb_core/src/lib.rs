#![forbid(unsafe_code)]

//! Core domain model and analysis engine for the Siqi prescription
//! energetics system.
//!
//! This crate provides:
//! - Domain types (thermal classes, flavors, channels, catalog entries)
//! - The reference herb catalog with alias and processing tables
//! - Prescription tokenizing and herb resolution
//! - The energetics pipeline (index, regions, net vector, interactions,
//!   kinetics, classification)
//! - Analysis record persistence (JSONL log, CSV rollup, history)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod parse;
pub mod resolver;
pub mod energetics;
pub mod regions;
pub mod vector;
pub mod pairs;
pub mod kinetics;
pub mod classifier;
pub mod engine;
pub mod constitution;
pub mod record;
pub mod csv_rollup;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, load_catalog};
pub use config::Config;
pub use parse::{parse_prescription, ParsedPrescription};
pub use engine::analyze;
pub use constitution::{load_profile, ConstitutionProfile};
pub use record::{AnalysisRecord, JsonlSink, RecordSink};
pub use history::load_recent_records;
