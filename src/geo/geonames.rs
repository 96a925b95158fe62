//! GeoNames postal-code dump (`FI.txt`) as a geo oracle.
//!
//! The dump is tab separated with no header:
//!
//! `country, postal code, place name, admin1 name, admin1 code, admin2 name,
//! admin2 code, admin3 name, admin3 code, latitude, longitude, accuracy`
//!
//! A postal code may appear on several rows (one per place). Its coordinate
//! is the mean of those rows, and its place name is the first row's.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{Coordinate, PostalCode};
use crate::error::AppError;
use crate::geo::GeoResolver;

const COUNTRY_CODE: &str = "FI";

const COL_COUNTRY: usize = 0;
const COL_POSTAL_CODE: usize = 1;
const COL_PLACE_NAME: usize = 2;
const COL_LATITUDE: usize = 9;
const COL_LONGITUDE: usize = 10;

#[derive(Debug, Clone)]
struct Place {
    coordinate: Coordinate,
    name: String,
}

/// Finnish postal codes with their (averaged) coordinates.
#[derive(Debug, Clone, Default)]
pub struct GeoNamesTable {
    places: HashMap<PostalCode, Place>,
}

impl GeoNamesTable {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to open GeoNames postal code file '{}': {e}", path.display()),
            )
        })?;
        let table = Self::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Failed to read GeoNames file '{}': {e}", path.display())))?;
        debug!(path = %path.display(), postal_codes = table.len(), "loaded GeoNames table");
        Ok(table)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        // code -> (lat sum, lon sum, rows, first place name)
        let mut sums: HashMap<PostalCode, (f64, f64, usize, String)> = HashMap::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            let record = result?;
            if record.get(COL_COUNTRY).map(str::trim) != Some(COUNTRY_CODE) {
                continue;
            }
            let code = record.get(COL_POSTAL_CODE).map(str::trim).filter(|s| !s.is_empty());
            let coord = parse_coordinate(record.get(COL_LATITUDE), record.get(COL_LONGITUDE));
            let (Some(code), Some(coord)) = (code, coord) else {
                skipped += 1;
                continue;
            };

            let entry = sums.entry(PostalCode::new(code)).or_insert_with(|| {
                let name = record.get(COL_PLACE_NAME).unwrap_or("").trim().to_string();
                (0.0, 0.0, 0, name)
            });
            entry.0 += coord.latitude();
            entry.1 += coord.longitude();
            entry.2 += 1;
        }

        if skipped > 0 {
            warn!(skipped, "ignored GeoNames rows without a postal code or coordinate");
        }

        let places = sums
            .into_iter()
            .filter_map(|(code, (lat, lon, n, name))| {
                let coordinate = Coordinate::new(lat / n as f64, lon / n as f64)?;
                Some((code, Place { coordinate, name }))
            })
            .collect();

        Ok(Self { places })
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Place name recorded for a postal code (e.g. "Helsinki").
    pub fn place_name(&self, postal_code: &PostalCode) -> Option<&str> {
        self.places
            .get(postal_code)
            .map(|p| p.name.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl GeoResolver for GeoNamesTable {
    fn resolve(&self, postal_code: &PostalCode) -> Option<Coordinate> {
        self.places.get(postal_code).map(|p| p.coordinate)
    }
}

fn parse_coordinate(lat: Option<&str>, lon: Option<&str>) -> Option<Coordinate> {
    let lat = lat?.trim().parse::<f64>().ok()?;
    let lon = lon?.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon)
}
