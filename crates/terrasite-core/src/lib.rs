//! Terrasite Core - Domain models, geometry workflows, and configuration
//!
//! This crate holds the terrain domain: the polygon model, area computation, the
//! interactive drawing state machine, the KML/KMZ import pipeline, assignment
//! rules, form validation, and the persistence port adapters implement.

pub mod area;
pub mod assignment;
pub mod config;
pub mod draft;
pub mod drawing;
pub mod error;
pub mod formats;
pub mod import;
pub mod models;
pub mod ports;
pub mod service;

pub use error::{ErrorKind, Result, TerrasiteError};
