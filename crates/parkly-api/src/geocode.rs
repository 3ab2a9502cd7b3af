// Best-effort address → coordinates lookup against a Nominatim-compatible
// search endpoint.
//
// Lookups never fail loudly: any transport or decoding problem is logged
// and reported as "no match", so manual coordinate entry is never blocked.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Public Nominatim instance used when no geocoder is configured.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// Nominatim encodes coordinates as strings.
#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

pub struct GeocodingClient {
    http: reqwest::Client,
    search_url: Url,
}

impl GeocodingClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let mut base = Url::parse(base_url)?;
        let path = base.path().trim_end_matches('/').to_owned();
        base.set_path(&format!("{path}/"));
        let search_url = base.join("search")?;
        Ok(Self { http, search_url })
    }

    /// Best match for `query`, or `None` when nothing usable came back.
    pub async fn lookup(&self, query: &str) -> Option<Coordinates> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        match self.search(query).await {
            Ok(found) => {
                debug!(query, found = found.is_some(), "geocode lookup");
                found
            }
            Err(e) => {
                warn!(query, error = %e, "geocode lookup failed");
                None
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Option<Coordinates>, Error> {
        let resp = self
            .http
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<Place> = resp.json().await?;
        Ok(places.into_iter().find_map(|p| {
            Some(Coordinates {
                latitude: p.lat.trim().parse().ok()?,
                longitude: p.lon.trim().parse().ok()?,
            })
        }))
    }
}

impl std::fmt::Debug for GeocodingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingClient")
            .field("search_url", &self.search_url.as_str())
            .finish_non_exhaustive()
    }
}
