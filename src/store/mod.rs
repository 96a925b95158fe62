//! Forecast store: loads artifacts on first use and keeps them for the
//! lifetime of the store.
//!
//! The store is built once and handed to the resolver by reference. Loaded
//! data is immutable and shared through `Arc`, so lookups never lock.
//!
//! Loads are cached per file. Categories that share a file (as the default
//! layout does for clustered forecasts and membership tables) share one
//! loaded copy. Concurrent first access to the same file is serialized on a
//! per-file slot, so each file is read once and every caller sees the same
//! `Arc`. Failed loads are not cached.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use tracing::info;

use crate::config::StoreConfig;
use crate::domain::{HousingCategory, Tier};
use crate::error::ResolveError;
use crate::io::{read_cluster_membership, read_forecast_artifact};

pub mod artifact;

pub use artifact::*;

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Per-key load-once cache.
struct LoadOnce<K, T> {
    slots: Mutex<HashMap<K, Slot<T>>>,
}

impl<K: Eq + Hash + Clone, T> LoadOnce<K, T> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_load(&self, key: &K, load: impl FnOnce() -> Result<T, ResolveError>) -> Result<Arc<T>, ResolveError> {
        // Hold the map lock only long enough to find this key's slot.
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(loaded) = guard.as_ref() {
            return Ok(Arc::clone(loaded));
        }
        let loaded = Arc::new(load()?);
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

/// Which kind of file an `ArtifactSummary` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    Direct,
    Clustered,
    Membership,
}

impl ArtifactKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ArtifactKind::Direct => "direct",
            ArtifactKind::Clustered => "clustered",
            ArtifactKind::Membership => "membership",
        }
    }
}

impl From<Tier> for ArtifactKind {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Direct => ArtifactKind::Direct,
            Tier::Clustered => ArtifactKind::Clustered,
        }
    }
}

/// What `preload_all` found in one configured file.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSummary {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    /// Categories configured to use this file.
    pub categories: Vec<HousingCategory>,
    /// Forecast keys, or members for a membership table.
    pub entries: usize,
    /// Postal codes with coordinates (direct artifacts only).
    pub coordinates: Option<usize>,
}

/// Owner of all loaded forecast data.
pub struct ForecastStore {
    config: StoreConfig,
    forecasts: LoadOnce<(Tier, PathBuf), ForecastArtifact>,
    memberships: LoadOnce<PathBuf, ClusterMembership>,
    loads: AtomicUsize,
}

impl ForecastStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            forecasts: LoadOnce::new(),
            memberships: LoadOnce::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of file reads performed so far (successful or not).
    pub fn loads_performed(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Forecast artifact for `(category, tier)`.
    pub fn load(&self, category: HousingCategory, tier: Tier) -> Result<Arc<ForecastArtifact>, ResolveError> {
        let path = self.config.forecast_path(category, tier);
        self.load_forecast_at(tier, path)
    }

    /// Cluster membership table for the category's family.
    pub fn load_cluster_membership(&self, category: HousingCategory) -> Result<Arc<ClusterMembership>, ResolveError> {
        let path = self.config.membership_path(category);
        self.load_membership_at(path)
    }

    /// Load every configured file (in parallel) and summarize each one.
    ///
    /// Summaries come back in `(kind, path)` order. Fails if any file is
    /// missing or malformed.
    pub fn preload_all(&self) -> Result<Vec<ArtifactSummary>, ResolveError> {
        let mut wanted: BTreeSet<(ArtifactKind, PathBuf)> = BTreeSet::new();
        for category in HousingCategory::ALL {
            for tier in [Tier::Direct, Tier::Clustered] {
                wanted.insert((tier.into(), self.config.forecast_path(category, tier)));
            }
            wanted.insert((ArtifactKind::Membership, self.config.membership_path(category)));
        }

        let wanted: Vec<(ArtifactKind, PathBuf)> = wanted.into_iter().collect();
        let summaries = wanted
            .into_par_iter()
            .map(|(kind, path)| self.summarize(kind, path))
            .collect::<Result<Vec<_>, _>>()?;

        info!(files = summaries.len(), loads = self.loads_performed(), "preloaded forecast data");
        Ok(summaries)
    }

    fn summarize(&self, kind: ArtifactKind, path: PathBuf) -> Result<ArtifactSummary, ResolveError> {
        let categories = self.categories_using(kind, &path);
        let (entries, coordinates) = match kind {
            ArtifactKind::Direct => {
                let a = self.load_forecast_at(Tier::Direct, path.clone())?;
                (a.len(), Some(a.coordinate_count()))
            }
            ArtifactKind::Clustered => {
                let a = self.load_forecast_at(Tier::Clustered, path.clone())?;
                (a.len(), None)
            }
            ArtifactKind::Membership => (self.load_membership_at(path.clone())?.len(), None),
        };
        Ok(ArtifactSummary {
            kind,
            path,
            categories,
            entries,
            coordinates,
        })
    }

    fn categories_using(&self, kind: ArtifactKind, path: &Path) -> Vec<HousingCategory> {
        HousingCategory::ALL
            .into_iter()
            .filter(|&c| {
                let configured = match kind {
                    ArtifactKind::Direct => self.config.forecast_path(c, Tier::Direct),
                    ArtifactKind::Clustered => self.config.forecast_path(c, Tier::Clustered),
                    ArtifactKind::Membership => self.config.membership_path(c),
                };
                configured == path
            })
            .collect()
    }

    fn load_forecast_at(&self, tier: Tier, path: PathBuf) -> Result<Arc<ForecastArtifact>, ResolveError> {
        let key = (tier, path);
        self.forecasts.get_or_load(&key, || {
            self.loads.fetch_add(1, Ordering::SeqCst);
            read_forecast_artifact(&key.1, tier)
        })
    }

    fn load_membership_at(&self, path: PathBuf) -> Result<Arc<ClusterMembership>, ResolveError> {
        self.memberships.get_or_load(&path, || {
            self.loads.fetch_add(1, Ordering::SeqCst);
            read_cluster_membership(&path, &self.config.label_column)
        })
    }
}
