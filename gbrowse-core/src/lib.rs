//! GBrowse Core Library
//!
//! Location resolution, span merging, semantic zoom and track layout
//! planning for a genome browser.

pub mod types;
pub mod error;
pub mod config;
pub mod location;
pub mod database;
pub mod merger;
pub mod labels;
pub mod layout;
pub mod render;
pub mod selection;
pub mod resolver;
#[cfg(feature = "io-gff")] pub mod gff;

// Re-export commonly used types and functions
pub use types::{Feature, MergeSpan, Position, RawFeature, Segment};
pub use error::{BrowseError, BrowseResult};
pub use config::{BrowserConfig, GeneralConfig, SettingValue, Stanza};
pub use location::{parse_location, LocationQuery};
pub use database::{FeatureDatabase, InMemoryDatabase};
pub use merger::{merge, merge_spans};
pub use labels::{feature_to_label, semantic_label, type_to_label, TypeIndex};
pub use layout::{BumpMode, Connector, TrackCounts, TrackDecision, TrackOption};
pub use render::{RenderPlan, RenderPlanner, RenderRequest, TrackPlan};
pub use selection::{default_tracks, select_source, select_tracks};
pub use resolver::SegmentResolver;

/// Version information for the GBrowse core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
