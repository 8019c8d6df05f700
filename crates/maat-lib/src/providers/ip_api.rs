use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{IpLocation, IpLocator, ProviderError};
use crate::http::HttpClient;

const SERVICE: &str = "ip-api";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// Secondary IP-geolocation provider (ip-api.com).
#[derive(Debug, Clone)]
pub struct IpApiClient {
    http: HttpClient,
    base_url: String,
}

impl IpApiClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, ip: Option<&str>) -> String {
        match ip {
            Some(ip) => format!("{}/json/{}", self.base_url, ip),
            None => format!("{}/json/", self.base_url),
        }
    }
}

#[async_trait]
impl IpLocator for IpApiClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn locate(&self, ip: Option<&str>) -> Result<IpLocation, ProviderError> {
        let request = self.http.get(&self.url(ip));
        let body = self.http.send_json(SERVICE, request).await?;
        parse_lookup(body)
    }
}

fn parse_lookup(body: Value) -> Result<IpLocation, ProviderError> {
    let response: LookupResponse =
        serde_json::from_value(body).map_err(|err| ProviderError::Contract {
            service: SERVICE,
            message: err.to_string(),
        })?;

    if response.status != "success" {
        return Err(ProviderError::Rejected {
            service: SERVICE,
            message: response
                .message
                .unwrap_or_else(|| format!("status {}", response.status)),
        });
    }

    match (response.lat, response.lon) {
        (Some(latitude), Some(longitude)) => Ok(IpLocation {
            latitude,
            longitude,
            city: response.city.unwrap_or_default(),
            country: response.country.unwrap_or_default(),
        }),
        _ => Err(ProviderError::Contract {
            service: SERVICE,
            message: "lat/lon missing".into(),
        }),
    }
}
