//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - held in the immutable artifact store
//! - returned from the resolver without copying whole artifacts
//! - exported to JSON/CSV

use std::borrow::Borrow;
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A Finnish postal code.
///
/// Stored verbatim and compared by exact string equality. `"00100"` and
/// `"100"` are different codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PostalCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque label of a postal-code cluster with a pooled forecast model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabel(String);

impl ClusterLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClusterLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// WGS84 latitude/longitude pair in degrees.
///
/// Both components are always finite. An unknown location is modelled as
/// `Option<Coordinate>::None`, never as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Returns `None` unless both components are finite.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite() && longitude.is_finite() {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }

    pub fn latitude(self) -> f64 {
        self.latitude
    }

    pub fn longitude(self) -> f64 {
        self.longitude
    }

    /// Flat squared Euclidean distance on raw degrees.
    ///
    /// No spherical correction is applied. Only the ordering of distances
    /// matters to callers, so the square root is skipped.
    pub fn squared_distance(self, other: Coordinate) -> f64 {
        let d_lat = other.latitude - self.latitude;
        let d_lon = other.longitude - self.longitude;
        d_lat * d_lat + d_lon * d_lon
    }
}

/// Housing-unit category offered by the forecast models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HousingCategory {
    OneRoom,
    TwoRoom,
    #[value(alias = "three or more room")]
    ThreeOrMoreRoom,
    #[value(alias = "terrace house")]
    TerraceHouse,
}

impl HousingCategory {
    pub const ALL: [HousingCategory; 4] = [
        HousingCategory::OneRoom,
        HousingCategory::TwoRoom,
        HousingCategory::ThreeOrMoreRoom,
        HousingCategory::TerraceHouse,
    ];

    /// Canonical label (also used in layout files).
    pub fn label(self) -> &'static str {
        match self {
            HousingCategory::OneRoom => "one-room",
            HousingCategory::TwoRoom => "two-room",
            HousingCategory::ThreeOrMoreRoom => "three-or-more-room",
            HousingCategory::TerraceHouse => "terrace-house",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            HousingCategory::OneRoom => "one-room",
            HousingCategory::TwoRoom => "two-room",
            HousingCategory::ThreeOrMoreRoom => "three or more room",
            HousingCategory::TerraceHouse => "terrace house",
        }
    }

    /// Parse a category label.
    ///
    /// Accepts the canonical kebab-case labels and the spaced spellings used
    /// by the web front-end. Anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        HousingCategory::ALL
            .into_iter()
            .find(|c| c.label() == label || c.display_name() == label)
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        match self {
            HousingCategory::OneRoom => 0,
            HousingCategory::TwoRoom => 1,
            HousingCategory::ThreeOrMoreRoom => 2,
            HousingCategory::TerraceHouse => 3,
        }
    }
}

impl fmt::Display for HousingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which forecast artifact of a category is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Models trained for a single postal code.
    Direct,
    /// Pooled models per cluster label.
    Clustered,
}

/// Which resolution step produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    Direct,
    Clustered,
    Nearest,
}

impl ResolutionTier {
    /// Lowercase label, as serialized.
    pub fn label(self) -> &'static str {
        match self {
            ResolutionTier::Direct => "direct",
            ResolutionTier::Clustered => "clustered",
            ResolutionTier::Nearest => "nearest",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForecastQuarter {
    year: i32,
    quarter: u8,
}

impl ForecastQuarter {
    pub const fn new(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }

    /// First day of the quarter.
    pub fn start_date(self) -> Option<NaiveDate> {
        if !(1..=4).contains(&self.quarter) {
            return None;
        }
        let month = u32::from(self.quarter - 1) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1)
    }
}

impl fmt::Display for ForecastQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl Serialize for ForecastQuarter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Number of forecast periods in every series.
pub const FORECAST_LEN: usize = 4;

/// The forecast horizon baked into the model artifacts (`pred_0` .. `pred_3`).
pub const FORECAST_QUARTERS: [ForecastQuarter; FORECAST_LEN] = [
    ForecastQuarter::new(2021, 3),
    ForecastQuarter::new(2021, 4),
    ForecastQuarter::new(2022, 1),
    ForecastQuarter::new(2022, 2),
];

/// One forecast period and its predicted price (EUR/m²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub quarter: ForecastQuarter,
    pub price: f64,
}

/// A full four-quarter price forecast.
///
/// Always exactly `FORECAST_LEN` points, ordered as `FORECAST_QUARTERS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastSeries {
    points: [ForecastPoint; FORECAST_LEN],
}

impl ForecastSeries {
    /// Build a series from per-quarter prices.
    ///
    /// Every price must be finite and non-negative.
    pub fn from_prices(prices: [f64; FORECAST_LEN]) -> Result<Self, String> {
        for (i, p) in prices.iter().enumerate() {
            if !p.is_finite() || *p < 0.0 {
                return Err(format!("Invalid price for pred_{i}: {p} (must be finite and >= 0)."));
            }
        }
        let points = std::array::from_fn(|i| ForecastPoint {
            quarter: FORECAST_QUARTERS[i],
            price: prices[i],
        });
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ForecastPoint; FORECAST_LEN] {
        &self.points
    }

    pub fn prices(&self) -> [f64; FORECAST_LEN] {
        self.points.map(|p| p.price)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter()
    }
}

/// Result of resolving a `(postal code, category)` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub postal_code: PostalCode,
    pub category: HousingCategory,
    pub tier: ResolutionTier,
    /// Postal code whose model was used instead. Set only for `Nearest`.
    pub substituted: Option<PostalCode>,
    pub series: ForecastSeries,
}
