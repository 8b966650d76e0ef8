//! Location lookup by city name or device coordinates

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ProviderError;

/// Default BigDataCloud API base URL
pub const DEFAULT_GEO_API: &str = "https://api.bigdatacloud.net/data";

/// Lookups give up after this long
pub const GEO_REQUEST_TIMEOUT_SECS: u64 = 30;

const UNKNOWN: &str = "Unknown";

/// A resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

/// Turns a city query or a coordinate pair into a [`Location`]
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn by_city(&self, city: &str) -> Result<Location, ProviderError>;

    async fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, ProviderError>;
}

/// Reject coordinates that cannot exist
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), ProviderError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ProviderError::LocationNotFound(format!("latitude {} out of range", latitude)));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ProviderError::LocationNotFound(format!(
            "longitude {} out of range",
            longitude
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    results: Vec<GeoSearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoSearchResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocode {
    #[serde(default)]
    city: String,
    #[serde(default)]
    locality: String,
    #[serde(default)]
    country_name: String,
}

fn location_from_search(
    query: &str,
    response: GeoSearchResponse,
) -> Result<Location, ProviderError> {
    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::LocationNotFound(format!("no match for {:?}", query)))?;

    Ok(Location {
        latitude: first.latitude,
        longitude: first.longitude,
        city: first.name,
        country: first.country_name.unwrap_or_else(|| UNKNOWN.to_string()),
    })
}

fn location_from_reverse(latitude: f64, longitude: f64, geocode: ReverseGeocode) -> Location {
    let city = [geocode.city, geocode.locality]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let country = if geocode.country_name.is_empty() {
        UNKNOWN.to_string()
    } else {
        geocode.country_name
    };

    Location { latitude, longitude, city, country }
}

/// Resolver backed by the BigDataCloud public endpoints
#[derive(Debug, Clone)]
pub struct BigDataCloudResolver {
    client: Client,
    base_url: String,
}

impl BigDataCloudResolver {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(GEO_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ProviderError::ProviderUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn denied(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl LocationResolver for BigDataCloudResolver {
    async fn by_city(&self, city: &str) -> Result<Location, ProviderError> {
        let query = city.trim();
        if query.is_empty() {
            return Err(ProviderError::LocationNotFound("empty city name".to_string()));
        }
        debug!("Looking up city {:?}", query);

        let not_found = |e: String| {
            ProviderError::LocationNotFound(format!(
                "Failed to find location for {}: {}",
                query, e
            ))
        };

        let response = self
            .client
            .get(format!("{}/geo-search", self.base_url))
            .query(&[("query", query), ("limit", "1")])
            .send()
            .await
            .map_err(|e| not_found(e.to_string()))?;

        if denied(response.status()) {
            return Err(ProviderError::LocationAccessDenied(format!(
                "geocoder answered {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(not_found(format!("geocoder answered {}", response.status())));
        }

        let body: GeoSearchResponse = response.json().await.map_err(|e| not_found(e.to_string()))?;
        let location = location_from_search(query, body)?;
        info!("Resolved {:?} to {}, {}", query, location.city, location.country);
        Ok(location)
    }

    async fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, ProviderError> {
        check_coordinates(latitude, longitude)?;
        debug!("Reverse geocoding {}, {}", latitude, longitude);

        let result = self
            .client
            .get(format!("{}/reverse-geocode-client", self.base_url))
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await;

        let geocode = match result {
            Ok(response) if denied(response.status()) => {
                return Err(ProviderError::LocationAccessDenied(format!(
                    "geocoder answered {}",
                    response.status()
                )));
            }
            Ok(response) if response.status().is_success() => {
                match response.json::<ReverseGeocode>().await {
                    Ok(geocode) => geocode,
                    Err(e) => {
                        warn!("Unreadable reverse geocode response, place name unknown: {}", e);
                        ReverseGeocode::default()
                    }
                }
            }
            Ok(response) => {
                warn!("Reverse geocoder answered {}, place name unknown", response.status());
                ReverseGeocode::default()
            }
            Err(e) => {
                warn!("Reverse geocoding failed, place name unknown: {}", e);
                ReverseGeocode::default()
            }
        };

        Ok(location_from_reverse(latitude, longitude, geocode))
    }
}
