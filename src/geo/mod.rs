//! Postal code → coordinate oracle.
//!
//! The resolver only needs two questions answered: "where is this postal
//! code?" and "is it a real one?". Unknown codes are `None`, never an error,
//! so callers can tell "no data" apart from a failed lookup.

use std::collections::HashMap;

use crate::domain::{Coordinate, PostalCode};

pub mod geonames;

pub use geonames::GeoNamesTable;

pub trait GeoResolver {
    /// Coordinate of `postal_code`, or `None` when it is unknown.
    fn resolve(&self, postal_code: &PostalCode) -> Option<Coordinate>;

    /// Admission check: a postal code is valid iff it has a coordinate.
    fn is_valid(&self, postal_code: &PostalCode) -> bool {
        self.resolve(postal_code).is_some()
    }
}

/// In-memory oracle.
#[derive(Debug, Clone, Default)]
pub struct StaticGeo {
    coordinates: HashMap<PostalCode, Coordinate>,
}

impl StaticGeo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a postal code. Non-finite coordinates leave it unknown.
    pub fn insert(&mut self, postal_code: impl Into<String>, latitude: f64, longitude: f64) {
        let code = PostalCode::new(postal_code);
        match Coordinate::new(latitude, longitude) {
            Some(coord) => {
                self.coordinates.insert(code, coord);
            }
            None => {
                self.coordinates.remove(&code);
            }
        }
    }

    pub fn with(mut self, postal_code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        self.insert(postal_code, latitude, longitude);
        self
    }
}

impl GeoResolver for StaticGeo {
    fn resolve(&self, postal_code: &PostalCode) -> Option<Coordinate> {
        self.coordinates.get(postal_code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_geo_validity_follows_resolve() {
        let geo = StaticGeo::new().with("00100", 60.17, 24.94).with("99999", f64::NAN, 0.0);
        assert!(geo.is_valid(&PostalCode::new("00100")));
        assert!(!geo.is_valid(&PostalCode::new("100")));
        assert!(!geo.is_valid(&PostalCode::new("99999")));
        assert!(!geo.is_valid(&PostalCode::new("")));
    }
}
