//! Render command implementation - plan track layout for a resolved location

use anyhow::{anyhow, Context, Result};
use gbrowse_core::{
    default_tracks, select_tracks, BrowserConfig, InMemoryDatabase, RawFeature, RenderPlan, RenderPlanner,
    RenderRequest, SegmentResolver, TrackOption,
};
use std::collections::HashMap;

/// Parse a `LABEL=CODE` track option override
pub fn parse_option_override(arg: &str) -> Result<(String, TrackOption)> {
    let (label, code) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid track option {:?}; expected LABEL=CODE", arg))?;
    let code: u8 = code
        .trim()
        .parse()
        .with_context(|| format!("Invalid option code in {:?}", arg))?;
    let option = TrackOption::try_from(code).map_err(|e| anyhow!(e))?;
    Ok((label.trim().to_string(), option))
}

/// Build the per-request inputs from command line arguments
pub fn build_request(
    config: &BrowserConfig,
    tracks: &[String],
    options: &[String],
    seed: Option<u64>,
) -> Result<RenderRequest> {
    let defaults = default_tracks(config);
    let tracks = if tracks.is_empty() {
        defaults
    } else {
        select_tracks(tracks, config, &defaults)
    };

    let options = options
        .iter()
        .map(|arg| parse_option_override(arg))
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(RenderRequest { tracks, options, seed })
}

/// Resolve `location` and plan one render pass per resulting segment
pub fn plan_location(
    config: &BrowserConfig,
    db: &InMemoryDatabase,
    location: &str,
    request: &RenderRequest,
) -> Result<Vec<(String, RenderPlan<RawFeature>)>> {
    let segments = SegmentResolver::new(db, config).resolve(location)?;
    if segments.is_empty() {
        return Err(anyhow!("Location {:?} not found", location));
    }

    let planner = RenderPlanner::new(config);
    let plans = segments
        .iter()
        .map(|segment| {
            let features = db.features_overlapping(segment);
            log::info!("{}: {} overlapping features", segment, features.len());
            (segment.to_string(), planner.plan(features, segment.length(), request))
        })
        .collect();
    Ok(plans)
}

pub fn execute(
    config: &BrowserConfig,
    db: &InMemoryDatabase,
    location: String,
    tracks: Vec<String>,
    options: Vec<String>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let request = build_request(config, &tracks, &options, seed)?;
    log::info!("Rendering {} with tracks {:?}", location, request.tracks);

    let plans = plan_location(config, db, &location, &request)?;

    if json {
        let by_segment: Vec<_> = plans
            .iter()
            .map(|(segment, plan)| serde_json::json!({ "segment": segment, "plan": plan }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&by_segment)?);
        return Ok(());
    }

    for (segment, plan) in &plans {
        println!("{} ({} bp)", segment, plan.display_length);
        for track in &plan.tracks {
            println!(
                "  {:<24} {:>6} features  {}  connector={}{}",
                track.label,
                track.feature_count,
                track.decision,
                track.connector,
                if track.dropped > 0 { format!("  ({} dropped)", track.dropped) } else { String::new() }
            );
        }
    }
    Ok(())
}
