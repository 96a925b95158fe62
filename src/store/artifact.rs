//! Loaded, immutable forecast data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{ClusterLabel, Coordinate, ForecastSeries, PostalCode, Tier};

/// One forecast file: key → series, plus postal-code coordinates for direct files.
#[derive(Debug, Clone)]
pub struct ForecastArtifact {
    path: PathBuf,
    tier: Tier,
    series: HashMap<String, ForecastSeries>,
    /// File order of the `latitude` mapping. Empty for clustered artifacts.
    coordinates: Vec<(PostalCode, Coordinate)>,
}

impl ForecastArtifact {
    pub fn new(
        path: impl Into<PathBuf>,
        tier: Tier,
        series: HashMap<String, ForecastSeries>,
        coordinates: Vec<(PostalCode, Coordinate)>,
    ) -> Self {
        Self {
            path: path.into(),
            tier,
            series,
            coordinates,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Number of keys with a forecast series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn coordinate_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Exact-key lookup in a direct artifact.
    pub fn direct_forecast(&self, postal_code: &PostalCode) -> Option<&ForecastSeries> {
        self.series.get(postal_code.as_str())
    }

    /// Exact-key lookup in a clustered artifact.
    pub fn clustered_forecast(&self, label: &ClusterLabel) -> Option<&ForecastSeries> {
        self.series.get(label.as_str())
    }

    /// Every postal code with a known coordinate, in load order.
    ///
    /// Each yielded code is guaranteed to have a direct series.
    pub fn all_coordinates(&self) -> impl Iterator<Item = (&PostalCode, Coordinate)> + '_ {
        self.coordinates.iter().map(|(code, coord)| (code, *coord))
    }
}

/// Postal code → cluster label table.
#[derive(Debug, Clone)]
pub struct ClusterMembership {
    path: PathBuf,
    labels: HashMap<PostalCode, ClusterLabel>,
}

impl ClusterMembership {
    pub fn new(path: impl Into<PathBuf>, labels: HashMap<PostalCode, ClusterLabel>) -> Self {
        Self {
            path: path.into(),
            labels,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_of(&self, postal_code: &PostalCode) -> Option<&ClusterLabel> {
        self.labels.get(postal_code)
    }
}
