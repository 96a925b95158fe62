//! Artifact layout and data-location configuration.
//!
//! The layout says which files back each housing category. Several categories
//! intentionally point at the same clustered forecast or membership table;
//! that aliasing is taken as configured and never inferred.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{HousingCategory, Tier};
use crate::error::AppError;

/// Environment variable naming the forecast data directory.
pub const ENV_DATA_DIR: &str = "HF_DATA_DIR";
/// Environment variable naming the GeoNames postal-code dump.
pub const ENV_GEONAMES_FILE: &str = "HF_GEONAMES_FILE";

pub const DEFAULT_DATA_DIR: &str = "json_prediction";
pub const DEFAULT_GEONAMES_FILE: &str = "FI.txt";
pub const DEFAULT_LABEL_COLUMN: &str = "label6";

/// Files backing one housing category, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryArtifacts {
    pub direct: PathBuf,
    pub clustered: PathBuf,
    pub membership: PathBuf,
}

impl CategoryArtifacts {
    fn new(direct: &str, clustered: &str, membership: &str) -> Self {
        Self {
            direct: PathBuf::from(direct),
            clustered: PathBuf::from(clustered),
            membership: PathBuf::from(membership),
        }
    }

    pub fn forecast(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Direct => &self.direct,
            Tier::Clustered => &self.clustered,
        }
    }
}

/// Category → artifact file mapping. Complete by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    entries: [CategoryArtifacts; 4],
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            entries: [
                CategoryArtifacts::new(
                    "emsembled_own/one_room_ensembled_forecast.json",
                    "emsembled_clusters/one_room_ensemble_cluster_forecasts.json",
                    "cluster_labels/one_room_cluster_dictionary.csv",
                ),
                CategoryArtifacts::new(
                    "emsembled_own/two_room_ensembled_forecast.json",
                    "emsembled_clusters/two_room_ensemble_cluster_forecasts.json",
                    "cluster_labels/two_room_cluster_dictionary.csv",
                ),
                CategoryArtifacts::new(
                    "emsembled_own/three-more_room_ensembled_forecast.json",
                    "emsembled_clusters/three-more_room_ensemble_cluster_forecasts.json",
                    "cluster_labels/two_room_cluster_dictionary.csv",
                ),
                CategoryArtifacts::new(
                    "emsembled_own/terrace_house_ensembled_forecast.json",
                    "emsembled_clusters/three-more_room_ensemble_cluster_forecasts.json",
                    "cluster_labels/two_room_cluster_dictionary.csv",
                ),
            ],
        }
    }
}

impl ArtifactLayout {
    /// Build a layout from a label-keyed map.
    ///
    /// Every category must be present exactly once; unknown labels are rejected.
    pub fn from_map(map: BTreeMap<String, CategoryArtifacts>) -> Result<Self, AppError> {
        let mut slots: [Option<CategoryArtifacts>; 4] = Default::default();
        for (label, artifacts) in map {
            let category = HousingCategory::from_label(&label)
                .ok_or_else(|| AppError::new(2, format!("Layout names unknown housing category '{label}'.")))?;
            if slots[category.index()].replace(artifacts).is_some() {
                return Err(AppError::new(
                    2,
                    format!("Layout configures '{}' more than once.", category.label()),
                ));
            }
        }

        match slots {
            [Some(a), Some(b), Some(c), Some(d)] => Ok(Self { entries: [a, b, c, d] }),
            partial => {
                let missing: Vec<&str> = HousingCategory::ALL
                    .into_iter()
                    .filter(|c| partial[c.index()].is_none())
                    .map(|c| c.label())
                    .collect();
                Err(AppError::new(
                    2,
                    format!("Layout is missing categories: {}", missing.join(", ")),
                ))
            }
        }
    }

    /// Read a layout JSON file: `{ "<category>": { "direct", "clustered", "membership" } }`.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open layout '{}': {e}", path.display())))?;
        let map: BTreeMap<String, CategoryArtifacts> = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid layout JSON '{}': {e}", path.display())))?;
        Self::from_map(map)
    }

    pub fn artifacts(&self, category: HousingCategory) -> &CategoryArtifacts {
        &self.entries[category.index()]
    }
}

/// Everything the forecast store needs to find its files.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub layout: ArtifactLayout,
    /// Membership CSV column holding the cluster label.
    pub label_column: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            layout: ArtifactLayout::default(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }

    pub fn forecast_path(&self, category: HousingCategory, tier: Tier) -> PathBuf {
        self.data_dir.join(self.layout.artifacts(category).forecast(tier))
    }

    pub fn membership_path(&self, category: HousingCategory) -> PathBuf {
        self.data_dir.join(&self.layout.artifacts(category).membership)
    }
}

/// Resolve the data directory: explicit flag, then `HF_DATA_DIR` (`.env` honored),
/// then the default.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    dotenvy::dotenv().ok();
    std::env::var_os(ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Resolve the GeoNames file: explicit flag, then `HF_GEONAMES_FILE`, then
/// `<data-dir>/FI.txt`.
pub fn resolve_geonames_file(flag: Option<&Path>, data_dir: &Path) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    dotenvy::dotenv().ok();
    std::env::var_os(ENV_GEONAMES_FILE)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join(DEFAULT_GEONAMES_FILE))
}
