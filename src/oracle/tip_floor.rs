//! Tip-floor oracle client
//!
//! Fetches the 75th percentile of recently landed tips from a public
//! statistics endpoint. Unlike the priority-fee oracle, absence of data here
//! is not an error: the tip calculator falls back to the routing-mode
//! minimum, so any non-2xx status, malformed payload, or missing field maps
//! to `None`.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// One entry of the tip statistics payload; only the 75th percentile field
/// is consumed, the rest is ignored
#[derive(Debug, Clone, Deserialize)]
struct TipFloorEntry {
    #[serde(default)]
    landed_tips_75th_percentile: Option<f64>,
}

/// HTTP client for the tip-floor statistics endpoint
#[derive(Debug, Clone)]
pub struct TipFloorClient {
    http: Client,
    url: String,
}

impl TipFloorClient {
    /// Create a client against the given statistics endpoint
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// The 75th-percentile recently-landed tip in SOL, or `None` when the
    /// oracle has no usable data
    pub async fn landed_tip_floor(&self) -> Option<f64> {
        let response = match self.http.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Tip floor request failed");
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "Tip floor endpoint returned non-2xx");
            return None;
        }
        let entries: Vec<TipFloorEntry> = match response.json().await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "Tip floor payload malformed");
                return None;
            }
        };
        let floor = entries
            .first()
            .and_then(|entry| entry.landed_tips_75th_percentile);
        match floor {
            Some(sol) => debug!(tip_floor_sol = sol, "Tip floor observed"),
            None => debug!("Tip floor payload missing 75th percentile field"),
        }
        floor
    }
}
