//! Domain types used throughout the lookup pipeline.
//!
//! This module defines:
//!
//! - identifiers (`PostalCode`, `ClusterLabel`) and `Coordinate`
//! - the closed category set (`HousingCategory`) and artifact `Tier`
//! - fixed-length forecast outputs (`ForecastSeries`, `Resolution`)

pub mod types;

pub use types::*;
