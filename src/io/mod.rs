//! Input/output helpers.
//!
//! - forecast artifact JSON ingest (`forecast`)
//! - cluster-membership CSV ingest (`membership`)
//! - resolution exports (CSV/JSON) (`export`)

pub mod export;
pub mod forecast;
pub mod membership;

pub use export::*;
pub use forecast::*;
pub use membership::*;
