//! Formatted terminal output for resolutions and store checks.
//!
//! We keep formatting code in one place so the lookup code stays clean and
//! output changes are localized.

use std::path::Path;

use crate::domain::{Resolution, ResolutionTier};
use crate::store::ArtifactSummary;

/// Results block for one resolution.
///
/// `place_name` is the optional locality of the requested postal code.
pub fn format_resolution(resolution: &Resolution, place_name: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("Results\n");
    let place = place_name.map(|p| format!(" ({p})")).unwrap_or_default();
    out.push_str(&format!(
        "Prediction price (EUR/m2) for {}{place} and {} for the next four quarters:\n",
        resolution.postal_code, resolution.category,
    ));

    for p in resolution.series.iter() {
        out.push_str(&format!("{}: {:.2} €/m²\n", p.quarter, p.price));
    }

    if let Some(note) = disclaimer(resolution) {
        out.push('\n');
        out.push_str(&note);
        out.push('\n');
    }

    out
}

/// Note telling the user a model other than the postal code's own was used.
pub fn disclaimer(resolution: &Resolution) -> Option<String> {
    match resolution.tier {
        ResolutionTier::Direct => None,
        ResolutionTier::Clustered => Some(format!(
            "No model was trained for {} alone. The prediction uses the model of postal codes similar to it.",
            resolution.postal_code
        )),
        ResolutionTier::Nearest => {
            let nearest = resolution.substituted.as_ref()?;
            Some(format!(
                "We didn't find a model for {}. Therefore, we predict with the model which is nearest to this postal code: {}.",
                resolution.postal_code, nearest
            ))
        }
    }
}

/// Table of configured files as reported by `ForecastStore::preload_all`.
pub fn format_check_summary(summaries: &[ArtifactSummary], data_dir: &Path) -> String {
    let mut out = String::new();
    out.push_str(&format!("Forecast data: {}\n", data_dir.display()));
    out.push_str(
        format!(
            "{:<10} {:>8} {:>8}  {:<48} {}\n",
            "kind", "entries", "coords", "file", "categories"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<10} {:-<8} {:-<8}  {:-<48} {:-<10}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for s in summaries {
        let file = s.path.strip_prefix(data_dir).unwrap_or(&s.path);
        let categories: Vec<&str> = s.categories.iter().map(|c| c.label()).collect();
        let coords = s.coordinates.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:<10} {:>8} {:>8}  {:<48} {}\n",
                s.kind.display_name(),
                s.entries,
                coords,
                truncate(&file.display().to_string(), 48),
                categories.join(", "),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{ForecastSeries, HousingCategory, PostalCode};
    use crate::store::ArtifactKind;

    fn resolution(tier: ResolutionTier, substituted: Option<&str>) -> Resolution {
        Resolution {
            postal_code: PostalCode::new("00999"),
            category: HousingCategory::TerraceHouse,
            tier,
            substituted: substituted.map(PostalCode::new),
            series: ForecastSeries::from_prices([5.0, 5.25, 6.0, 6.5]).unwrap(),
        }
    }

    #[test]
    fn nearest_resolution_includes_disclaimer() {
        let txt = format_resolution(&resolution(ResolutionTier::Nearest, Some("00300")), None);
        let expected = concat!(
            "Results\n",
            "Prediction price (EUR/m2) for 00999 and terrace house for the next four quarters:\n",
            "Q3 2021: 5.00 €/m²\n",
            "Q4 2021: 5.25 €/m²\n",
            "Q1 2022: 6.00 €/m²\n",
            "Q2 2022: 6.50 €/m²\n",
            "\n",
            "We didn't find a model for 00999. Therefore, we predict with the model which is nearest to this postal code: 00300.\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn direct_resolution_has_no_disclaimer() {
        let r = resolution(ResolutionTier::Direct, None);
        assert!(disclaimer(&r).is_none());
        let txt = format_resolution(&r, Some("Helsinki"));
        assert!(txt.contains("for 00999 (Helsinki) and terrace house"));
        assert!(!txt.contains("nearest"));
    }

    #[test]
    fn clustered_resolution_mentions_similar_codes() {
        let r = resolution(ResolutionTier::Clustered, None);
        assert!(disclaimer(&r).unwrap().contains("similar"));
    }

    #[test]
    fn check_summary_lists_relative_paths() {
        let root = PathBuf::from("/data");
        let summaries = vec![ArtifactSummary {
            kind: ArtifactKind::Direct,
            path: root.join("emsembled_own/one_room_ensembled_forecast.json"),
            categories: vec![HousingCategory::OneRoom],
            entries: 12,
            coordinates: Some(11),
        }];
        let txt = format_check_summary(&summaries, &root);
        let row = txt.lines().last().unwrap();
        assert!(row.starts_with("direct"));
        assert!(row.contains("emsembled_own/one_room_ensembled_forecast.json"));
        assert!(row.ends_with("one-room"));
        assert!(row.contains("12"));
    }
}
