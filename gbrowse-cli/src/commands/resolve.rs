//! Resolve command implementation - turn location strings into segments

use anyhow::Result;
use gbrowse_core::{BrowseResult, BrowserConfig, FeatureDatabase, Segment, SegmentResolver};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Resolution {
    pub location: String,
    pub segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve every location in parallel, keeping input order
pub fn resolve_all<D>(locations: &[String], db: &D, config: &BrowserConfig) -> Vec<(String, BrowseResult<Vec<Segment>>)>
where
    D: FeatureDatabase + Sync,
{
    locations
        .par_iter()
        .map(|location| {
            let resolver = SegmentResolver::new(db, config);
            (location.clone(), resolver.resolve(location))
        })
        .collect()
}

pub fn execute<D>(config: &BrowserConfig, db: &D, locations: Vec<String>, json: bool) -> Result<()>
where
    D: FeatureDatabase + Sync,
{
    log::info!("Resolving {} locations", locations.len());
    let results = resolve_all(&locations, db, config);

    let mut failures = 0;
    let resolutions: Vec<Resolution> = results
        .into_iter()
        .map(|(location, result)| match result {
            Ok(segments) => Resolution { location, segments, error: None },
            Err(err) => {
                failures += 1;
                log::warn!("{}: {}", location, err);
                Resolution { location, segments: Vec::new(), error: Some(err.to_string()) }
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
    } else {
        for resolution in &resolutions {
            if let Some(error) = &resolution.error {
                println!("{}\terror: {}", resolution.location, error);
            } else if resolution.segments.is_empty() {
                println!("{}\tnot found", resolution.location);
            }
            for segment in &resolution.segments {
                println!("{}\t{}\t{}", resolution.location, segment, segment.length());
            }
        }
    }

    if failures > 0 {
        log::warn!("{} of {} locations failed", failures, resolutions.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbrowse_core::{InMemoryDatabase, RawFeature};

    #[test]
    fn test_results_keep_input_order() {
        let mut db = InMemoryDatabase::new();
        db.add_landmark("chrI", 15_000_000);
        db.add_feature("gene", RawFeature::new("chrI", 100, 900, "gene", "unc-9"), &[]);
        let config = BrowserConfig::default();

        let locations: Vec<String> = ["unc-9", "chrI:1..500", "nothing", "chrI:1.5-3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = resolve_all(&locations, &db, &config);

        let order: Vec<_> = results.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(order, vec!["unc-9", "chrI:1..500", "nothing", "chrI:1.5-3"]);
        assert_eq!(results[0].1.as_ref().unwrap().len(), 1);
        assert_eq!(results[1].1.as_ref().unwrap()[0].end(), 500);
        assert!(results[2].1.as_ref().unwrap().is_empty());
        assert!(results[3].1.is_err());
    }
}
