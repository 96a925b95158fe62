//! `housing-forecast` library crate.
//!
//! The binary (`hf`) is a thin wrapper around this library so that:
//!
//! - the tiered lookup is testable without spawning processes
//! - the store and resolver are reusable behind another front end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod io;
pub mod plot;
pub mod report;
pub mod resolve;
pub mod store;
