//! Fetch, validate and fall back.
//!
//! Loading never fails from the caller's point of view: any fetch or parse
//! problem, or a document with nothing usable in it, is logged and the
//! built-in sample dataset is returned instead.

use scene::{CableRoute, Topology};
use tracing::{debug, info, warn};

use crate::document::{DocumentError, Parsed, RecordError, parse_cables, parse_topology};
use crate::sample::{sample_cables, sample_topology};
use crate::source::TopologySource;

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub data: T,
    pub used_fallback: bool,
    /// Why the sample dataset was used, if it was.
    pub fallback_reason: Option<String>,
    /// Records dropped during validation.
    pub rejected: usize,
}

impl<T> Loaded<T> {
    fn fresh(data: T, rejected: usize) -> Self {
        Self {
            data,
            used_fallback: false,
            fallback_reason: None,
            rejected,
        }
    }

    fn fallback(data: T, reason: String) -> Self {
        Self {
            data,
            used_fallback: true,
            fallback_reason: Some(reason),
            rejected: 0,
        }
    }
}

pub async fn load_topology(source: &dyn TopologySource) -> Loaded<Topology> {
    let loaded = load_with(
        source,
        "topology",
        parse_topology,
        Topology::is_empty,
        sample_topology,
    )
    .await;
    if !loaded.used_fallback {
        info!(
            source = %source.describe(),
            elements = loaded.data.elements().len(),
            links = loaded.data.links().len(),
            rejected = loaded.rejected,
            "topology loaded"
        );
    }
    loaded
}

pub async fn load_cables(source: &dyn TopologySource) -> Loaded<Vec<CableRoute>> {
    let loaded = load_with(source, "cables", parse_cables, Vec::is_empty, sample_cables).await;
    if !loaded.used_fallback {
        info!(
            source = %source.describe(),
            cables = loaded.data.len(),
            rejected = loaded.rejected,
            "cables loaded"
        );
    }
    loaded
}

async fn load_with<T>(
    source: &dyn TopologySource,
    what: &'static str,
    parse: fn(&str) -> Result<Parsed<T>, DocumentError>,
    is_empty: fn(&T) -> bool,
    sample: fn() -> T,
) -> Loaded<T> {
    let location = source.describe();

    let reason = match source.fetch().await {
        Err(e) => e.to_string(),
        Ok(payload) => match parse(&payload) {
            Err(e) => e.to_string(),
            Ok(parsed) => {
                log_rejected(&location, &parsed.rejected);
                if is_empty(&parsed.data) {
                    format!("{what} document has no valid records")
                } else {
                    return Loaded::fresh(parsed.data, parsed.rejected.len());
                }
            }
        },
    };

    warn!(source = %location, reason = %reason, "{what} unavailable, using sample data");
    Loaded::fallback(sample(), reason)
}

fn log_rejected(location: &str, rejected: &[RecordError]) {
    for record in rejected {
        debug!(source = %location, "dropped record {record}");
    }
}
