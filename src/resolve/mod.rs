//! Tiered forecast resolution.
//!
//! For a postal code and housing category the resolver tries, in order:
//!
//! 1. **direct**: a model trained for exactly this postal code
//! 2. **clustered**: the pooled model of the postal code's cluster
//! 3. **nearest**: the direct model of the geographically nearest postal code
//!
//! The first tier that produces a series wins; later tiers are not loaded.
//! Postal codes without a known location are rejected before anything is
//! loaded.

use tracing::{debug, info, warn};

use crate::domain::{HousingCategory, PostalCode, Resolution, ResolutionTier, Tier};
use crate::error::ResolveError;
use crate::geo::GeoResolver;
use crate::store::ForecastStore;

pub mod nearest;

pub use nearest::nearest_candidate;

/// Stateless view over a store and a geo oracle.
pub struct ForecastResolver<'a, G: GeoResolver + ?Sized> {
    store: &'a ForecastStore,
    geo: &'a G,
}

impl<'a, G: GeoResolver + ?Sized> ForecastResolver<'a, G> {
    pub fn new(store: &'a ForecastStore, geo: &'a G) -> Self {
        Self { store, geo }
    }

    /// Resolve using a category label (`"one-room"`, `"terrace house"`, ...).
    pub fn resolve_label(&self, postal_code: &str, category: &str) -> Result<Resolution, ResolveError> {
        let category = HousingCategory::from_label(category).ok_or_else(|| ResolveError::UnknownCategory {
            label: category.to_string(),
        })?;
        self.resolve(postal_code, category)
    }

    pub fn resolve(&self, postal_code: &str, category: HousingCategory) -> Result<Resolution, ResolveError> {
        let postal_code = PostalCode::new(postal_code);
        if !self.geo.is_valid(&postal_code) {
            return Err(ResolveError::InvalidPostalCode {
                postal_code: postal_code.as_str().to_string(),
            });
        }

        let direct = self.store.load(category, Tier::Direct)?;
        if let Some(series) = direct.direct_forecast(&postal_code) {
            debug!(%postal_code, %category, "found own model");
            return Ok(Resolution {
                postal_code,
                category,
                tier: ResolutionTier::Direct,
                substituted: None,
                series: series.clone(),
            });
        }

        let membership = self.store.load_cluster_membership(category)?;
        if let Some(label) = membership.label_of(&postal_code) {
            let clustered = self.store.load(category, Tier::Clustered)?;
            if let Some(series) = clustered.clustered_forecast(label) {
                debug!(
                    %postal_code,
                    %category,
                    %label,
                    membership = %membership.path().display(),
                    "found cluster model"
                );
                return Ok(Resolution {
                    postal_code,
                    category,
                    tier: ResolutionTier::Clustered,
                    substituted: None,
                    series: series.clone(),
                });
            }
            warn!(
                %postal_code,
                %label,
                path = %clustered.path().display(),
                "cluster label has no clustered forecast; falling back to nearest postal code"
            );
        }

        let no_candidates = || ResolveError::NoCandidatesAvailable { category };

        // Validated above, so a miss here means the oracle is inconsistent.
        let target = self.geo.resolve(&postal_code).ok_or_else(no_candidates)?;
        let (nearest, distance) = nearest_candidate(target, direct.all_coordinates()).ok_or_else(no_candidates)?;
        let series = direct.direct_forecast(nearest).ok_or_else(no_candidates)?;

        info!(%postal_code, %category, nearest = %nearest, distance, "no model found; using nearest postal code");
        Ok(Resolution {
            postal_code,
            category,
            tier: ResolutionTier::Nearest,
            substituted: Some(nearest.clone()),
            series: series.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, create_dir_all};
    use std::io::Write;
    use std::path::Path;

    use crate::config::StoreConfig;
    use crate::domain::{Coordinate, ForecastSeries};
    use crate::geo::StaticGeo;

    fn write(root: &Path, rel: &Path, body: &str) {
        let path = root.join(rel);
        create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(body.as_bytes()).unwrap();
    }

    /// Builds artifact JSON from `(key, prices, optional (lat, lon))` rows.
    fn artifact_json(rows: &[(&str, [f64; 4], Option<(f64, f64)>)]) -> String {
        let mut obj = serde_json::Map::new();
        for i in 0..4 {
            let col: serde_json::Map<String, serde_json::Value> =
                rows.iter().map(|(k, p, _)| (k.to_string(), p[i].into())).collect();
            obj.insert(format!("pred_{i}"), col.into());
        }
        let lat: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .filter_map(|(k, _, c)| c.map(|(lat, _)| (k.to_string(), lat.into())))
            .collect();
        let lon: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .filter_map(|(k, _, c)| c.map(|(_, lon)| (k.to_string(), lon.into())))
            .collect();
        obj.insert("latitude".to_string(), lat.into());
        obj.insert("longitude".to_string(), lon.into());
        serde_json::Value::Object(obj).to_string()
    }

    struct Fixture {
        dir: tempfile::TempDir,
        config: StoreConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = StoreConfig::new(dir.path());
            Self { dir, config }
        }

        fn direct(&self, category: HousingCategory, rows: &[(&str, [f64; 4], Option<(f64, f64)>)]) -> &Self {
            let rel = &self.config.layout.artifacts(category).direct;
            write(self.dir.path(), rel, &artifact_json(rows));
            self
        }

        fn clustered(&self, category: HousingCategory, rows: &[(&str, [f64; 4])]) -> &Self {
            let rows: Vec<(&str, [f64; 4], Option<(f64, f64)>)> = rows.iter().map(|(k, p)| (*k, *p, None)).collect();
            let rel = &self.config.layout.artifacts(category).clustered;
            write(self.dir.path(), rel, &artifact_json(&rows));
            self
        }

        fn membership(&self, category: HousingCategory, rows: &[(&str, &str)]) -> &Self {
            let mut body = String::from("Postal code,label6\n");
            for (code, label) in rows {
                body.push_str(&format!("{code},{label}\n"));
            }
            let rel = &self.config.layout.artifacts(category).membership;
            write(self.dir.path(), rel, &body);
            self
        }

        fn store(&self) -> ForecastStore {
            ForecastStore::new(self.config.clone())
        }
    }

    fn series(prices: [f64; 4]) -> ForecastSeries {
        ForecastSeries::from_prices(prices).unwrap()
    }

    #[test]
    fn direct_hit_without_cluster_table() {
        let fx = Fixture::new();
        fx.direct(
            HousingCategory::OneRoom,
            &[("00100", [10.0, 11.0, 12.0, 13.0], Some((60.17, 24.94)))],
        );
        let store = fx.store();
        let geo = StaticGeo::new().with("00100", 60.17, 24.94);

        let r = ForecastResolver::new(&store, &geo)
            .resolve("00100", HousingCategory::OneRoom)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Direct);
        assert_eq!(r.series, series([10.0, 11.0, 12.0, 13.0]));
        assert_eq!(r.substituted, None);
        // Membership and clustered files were never needed.
        assert_eq!(store.loads_performed(), 1);
    }

    #[test]
    fn direct_wins_over_cluster_membership() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::TwoRoom, &[("00200", [1.0; 4], Some((60.0, 25.0)))])
            .membership(HousingCategory::TwoRoom, &[("00200", "A")])
            .clustered(HousingCategory::TwoRoom, &[("A", [20.0, 21.0, 22.0, 23.0])]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00200", 60.0, 25.0);

        let r = ForecastResolver::new(&store, &geo)
            .resolve("00200", HousingCategory::TwoRoom)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Direct);
        assert_eq!(r.series.prices(), [1.0; 4]);
    }

    #[test]
    fn clustered_hit() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::TwoRoom, &[])
            .membership(HousingCategory::TwoRoom, &[("00200", "A")])
            .clustered(HousingCategory::TwoRoom, &[("A", [20.0, 21.0, 22.0, 23.0])]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00200", 60.2, 24.9);

        let r = ForecastResolver::new(&store, &geo)
            .resolve("00200", HousingCategory::TwoRoom)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Clustered);
        assert_eq!(r.series, series([20.0, 21.0, 22.0, 23.0]));
        assert_eq!(r.substituted, None);
    }

    #[test]
    fn nearest_fallback_reports_substitute() {
        let fx = Fixture::new();
        fx.direct(
            HousingCategory::TerraceHouse,
            &[
                ("00300", [5.0; 4], Some((60.1, 24.9))),
                ("00400", [9.0; 4], Some((60.2, 25.0))),
            ],
        )
        .membership(HousingCategory::TerraceHouse, &[]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00999", 60.11, 24.91);

        let r = ForecastResolver::new(&store, &geo)
            .resolve("00999", HousingCategory::TerraceHouse)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Nearest);
        assert_eq!(r.series, series([5.0; 4]));
        assert_eq!(r.substituted, Some(PostalCode::new("00300")));
        assert_eq!(r.postal_code, PostalCode::new("00999"));
    }

    #[test]
    fn cluster_label_without_forecast_falls_through_to_nearest() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::OneRoom, &[("00100", [7.0; 4], Some((60.17, 24.94)))])
            .membership(HousingCategory::OneRoom, &[("00150", "Z")])
            .clustered(HousingCategory::OneRoom, &[("A", [1.0; 4])]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00150", 60.16, 24.93);

        let r = ForecastResolver::new(&store, &geo)
            .resolve("00150", HousingCategory::OneRoom)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Nearest);
        assert_eq!(r.substituted, Some(PostalCode::new("00100")));
    }

    #[test]
    fn invalid_postal_code_loads_nothing() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::OneRoom, &[("00100", [1.0; 4], Some((60.17, 24.94)))]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00100", 60.17, 24.94);

        let err = ForecastResolver::new(&store, &geo)
            .resolve("0010", HousingCategory::OneRoom)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidPostalCode {
                postal_code: "0010".to_string()
            }
        );
        assert_eq!(store.loads_performed(), 0);
    }

    #[test]
    fn unknown_category_label() {
        let fx = Fixture::new();
        let store = fx.store();
        let geo = StaticGeo::new().with("00100", 60.17, 24.94);

        let err = ForecastResolver::new(&store, &geo)
            .resolve_label("00100", "studio")
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownCategory { .. }));
        assert_eq!(store.loads_performed(), 0);
    }

    #[test]
    fn resolve_label_accepts_spaced_spelling() {
        let fx = Fixture::new();
        fx.direct(
            HousingCategory::ThreeOrMoreRoom,
            &[("00100", [3.0; 4], Some((60.17, 24.94)))],
        );
        let store = fx.store();
        let geo = StaticGeo::new().with("00100", 60.17, 24.94);

        let r = ForecastResolver::new(&store, &geo)
            .resolve_label("00100", "three or more room")
            .unwrap();
        assert_eq!(r.category, HousingCategory::ThreeOrMoreRoom);
    }

    /// Admits every code but never knows where one is.
    struct UnplacedGeo;

    impl GeoResolver for UnplacedGeo {
        fn resolve(&self, _postal_code: &PostalCode) -> Option<Coordinate> {
            None
        }

        fn is_valid(&self, _postal_code: &PostalCode) -> bool {
            true
        }
    }

    #[test]
    fn admitted_code_without_coordinate_has_no_candidates() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::OneRoom, &[("00100", [1.0; 4], Some((60.17, 24.94)))])
            .membership(HousingCategory::OneRoom, &[("00111", "A")]);
        let store = fx.store();

        let err = ForecastResolver::new(&store, &UnplacedGeo)
            .resolve("00999", HousingCategory::OneRoom)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoCandidatesAvailable {
                category: HousingCategory::OneRoom
            }
        );
    }

    #[test]
    fn empty_direct_artifact_has_no_candidates() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::TwoRoom, &[]).membership(HousingCategory::TwoRoom, &[]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00200", 60.2, 24.9);

        let err = ForecastResolver::new(&store, &geo)
            .resolve("00200", HousingCategory::TwoRoom)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoCandidatesAvailable {
                category: HousingCategory::TwoRoom
            }
        );
    }

    #[test]
    fn missing_artifact_is_fatal() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::OneRoom, &[("00100", [1.0; 4], Some((60.17, 24.94)))]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00999", 60.0, 25.0);

        // No membership table written for one-room.
        let err = ForecastResolver::new(&store, &geo)
            .resolve("00999", HousingCategory::OneRoom)
            .unwrap_err();
        assert!(matches!(err, ResolveError::ArtifactNotFound { .. }));
    }

    #[test]
    fn repeated_resolution_is_identical_including_ties() {
        let fx = Fixture::new();
        fx.direct(
            HousingCategory::OneRoom,
            &[
                ("00510", [1.0; 4], Some((60.5, 25.0))),
                ("00500", [2.0; 4], Some((59.5, 25.0))),
                ("00520", [3.0; 4], Some((61.0, 26.0))),
            ],
        )
        .membership(HousingCategory::OneRoom, &[]);
        let store = fx.store();
        let geo = StaticGeo::new().with("00505", 60.0, 25.0);
        let resolver = ForecastResolver::new(&store, &geo);

        let first = resolver.resolve("00505", HousingCategory::OneRoom).unwrap();
        assert_eq!(first.substituted, Some(PostalCode::new("00510")));
        for _ in 0..10 {
            assert_eq!(resolver.resolve("00505", HousingCategory::OneRoom).unwrap(), first);
        }
        assert_eq!(store.loads_performed(), 2);
    }

    #[test]
    fn every_tier_returns_four_points() {
        let fx = Fixture::new();
        fx.direct(HousingCategory::OneRoom, &[("00100", [1.0, 2.0, 3.0, 4.0], Some((60.17, 24.94)))])
            .membership(HousingCategory::OneRoom, &[("00200", "A")])
            .clustered(HousingCategory::OneRoom, &[("A", [5.0, 6.0, 7.0, 8.0])]);
        let store = fx.store();
        let geo = StaticGeo::new()
            .with("00100", 60.17, 24.94)
            .with("00200", 60.16, 24.9)
            .with("00300", 60.3, 25.0);
        let resolver = ForecastResolver::new(&store, &geo);

        for code in ["00100", "00200", "00300"] {
            let r = resolver.resolve(code, HousingCategory::OneRoom).unwrap();
            assert_eq!(r.series.points().len(), 4);
            let quarters: Vec<String> = r.series.iter().map(|p| p.quarter.to_string()).collect();
            assert_eq!(quarters, ["Q3 2021", "Q4 2021", "Q1 2022", "Q2 2022"]);
        }
    }
}
