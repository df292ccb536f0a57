use std::time::Duration;

use log::{error, info};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const UNKNOWN_LATITUDE: &str = "Unknown Latitude";
pub const UNKNOWN_LONGITUDE: &str = "Unknown Longitude";

const GEO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geolocation response has no usable coordinates")]
    MissingCoordinates,
}

#[derive(Deserialize)]
struct GeoResponse {
    loc: Option<String>,
}

/// IP-based geolocation of the server itself. The provider returns coordinates
/// as a comma-joined "lat,lon" string in its `loc` field.
#[derive(Clone)]
pub struct GeoService {
    client: Client,
    endpoint: String,
}

impl GeoService {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Best-effort lookup. Any failure is logged and replaced with the sentinel
    /// pair; callers never see an error from this step.
    pub async fn lookup(&self) -> (String, String) {
        match self.fetch().await {
            Ok((latitude, longitude)) => {
                info!(
                    "Location fetched: Latitude: {}, Longitude: {}",
                    latitude, longitude
                );
                (latitude, longitude)
            }
            Err(e) => {
                error!("Failed to fetch location: {}", e);
                (UNKNOWN_LATITUDE.to_string(), UNKNOWN_LONGITUDE.to_string())
            }
        }
    }

    async fn fetch(&self) -> Result<(String, String), GeoError> {
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(GEO_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let body: GeoResponse = response.json().await?;
        let loc = body.loc.ok_or(GeoError::MissingCoordinates)?;
        parse_loc(&loc).ok_or(GeoError::MissingCoordinates)
    }
}

fn parse_loc(loc: &str) -> Option<(String, String)> {
    let (latitude, longitude) = loc.split_once(',')?;
    if latitude.is_empty() || longitude.is_empty() {
        return None;
    }
    Some((latitude.to_string(), longitude.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loc_splits_coordinates() {
        assert_eq!(
            parse_loc("12.9716,77.5946"),
            Some(("12.9716".to_string(), "77.5946".to_string()))
        );
    }

    #[test]
    fn parse_loc_rejects_malformed_values() {
        assert_eq!(parse_loc(""), None);
        assert_eq!(parse_loc("12.9716"), None);
        assert_eq!(parse_loc("12.9716,"), None);
        assert_eq!(parse_loc(",77.5946"), None);
    }
}
