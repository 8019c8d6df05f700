use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{coerce_f64, IpLocation, IpLocator, ProviderError};
use crate::http::HttpClient;

const SERVICE: &str = "ip2location";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    latitude: Option<Value>,
    longitude: Option<Value>,
    city_name: Option<String>,
    country_name: Option<String>,
    error: Option<LookupError>,
}

#[derive(Debug, Deserialize)]
struct LookupError {
    error_code: Option<i64>,
    error_message: Option<String>,
}

/// Primary IP-geolocation provider (ip2location.io).
#[derive(Debug, Clone)]
pub struct Ip2LocationClient {
    http: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl Ip2LocationClient {
    pub fn new(http: HttpClient, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl IpLocator for Ip2LocationClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn locate(&self, ip: Option<&str>) -> Result<IpLocation, ProviderError> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(ip) = ip {
            params.push(("ip", ip));
        }
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }

        let request = self.http.get(&self.base_url).query(&params);
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

    if let Some(error) = response.error {
        return Err(ProviderError::Rejected {
            service: SERVICE,
            message: format!(
                "{} (code {})",
                error.error_message.unwrap_or_else(|| "unknown error".into()),
                error.error_code.unwrap_or_default()
            ),
        });
    }

    let latitude = response.latitude.as_ref().and_then(coerce_f64);
    let longitude = response.longitude.as_ref().and_then(coerce_f64);
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(IpLocation {
            latitude,
            longitude,
            city: response.city_name.unwrap_or_default(),
            country: response.country_name.unwrap_or_default(),
        }),
        _ => Err(ProviderError::Contract {
            service: SERVICE,
            message: "latitude/longitude missing".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_lookup() {
        let body = json!({
            "ip": "8.8.8.8",
            "country_code": "KR",
            "country_name": "Korea (Republic of)",
            "region_name": "Seoul",
            "city_name": "Seoul",
            "latitude": 37.566,
            "longitude": "126.9784",
            "is_proxy": false
        });
        let location = parse_lookup(body).unwrap();
        assert_eq!(location.city, "Seoul");
        assert_eq!(location.country, "Korea (Republic of)");
        assert!((location.longitude - 126.9784).abs() < 1e-9);
    }

    #[test]
    fn error_object_is_rejection() {
        let body = json!({"error": {"error_code": 10001, "error_message": "Invalid IP address."}});
        let err = parse_lookup(body).unwrap_err();
        match err {
            ProviderError::Rejected { message, .. } => {
                assert!(message.contains("Invalid IP address."));
                assert!(message.contains("10001"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_coordinates_is_contract_violation() {
        let err = parse_lookup(json!({"city_name": "Seoul"})).unwrap_err();
        assert!(matches!(err, ProviderError::Contract { .. }));
    }
}
