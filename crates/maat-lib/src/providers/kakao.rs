//! Kakao Local keyword search, used both for places and for geocoding
//! named locations.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    coerce_f64, GeocodedPlace, Geocoder, PlaceQuery, PlaceRow, PlacesProvider, ProviderError,
};
use crate::http::HttpClient;

const SERVICE: &str = "kakao";
const KEY_VARIABLE: &str = "KAKAO_API_KEY";
const KEYWORD_PATH: &str = "/v2/local/search/keyword.json";

#[derive(Debug, Deserialize)]
struct KeywordResponse {
    documents: Vec<KeywordDocument>,
}

#[derive(Debug, Deserialize)]
struct KeywordDocument {
    place_name: Option<String>,
    address_name: Option<String>,
    category_name: Option<String>,
    distance: Option<Value>,
    rating: Option<Value>,
    /// Longitude as a decimal string.
    x: Option<Value>,
    /// Latitude as a decimal string.
    y: Option<Value>,
}

/// Kakao Local API client.
#[derive(Debug, Clone)]
pub struct KakaoClient {
    http: HttpClient,
    api_key: Option<String>,
    endpoint: String,
}

impl KakaoClient {
    pub fn new(http: HttpClient, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), KEYWORD_PATH),
        }
    }

    async fn keyword(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<KeywordDocument>, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingKey {
            service: SERVICE,
            variable: KEY_VARIABLE,
        })?;

        let request = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("KakaoAK {}", key))
            .query(params);

        let body = self.http.send_json(SERVICE, request).await?;
        parse_keyword_response(body)
    }
}

#[async_trait]
impl PlacesProvider for KakaoClient {
    async fn keyword_search(&self, query: &PlaceQuery) -> Result<Vec<PlaceRow>, ProviderError> {
        let params = [
            ("query", query.phrase.clone()),
            ("x", query.longitude.to_string()),
            ("y", query.latitude.to_string()),
            ("radius", query.radius_m.to_string()),
            ("sort", "distance".to_string()),
        ];
        let documents = self.keyword(&params).await?;
        debug!(phrase = %query.phrase, rows = documents.len(), "kakao keyword search");
        Ok(documents.into_iter().map(into_place_row).collect())
    }
}

#[async_trait]
impl Geocoder for KakaoClient {
    async fn geocode(&self, name: &str) -> Result<Vec<GeocodedPlace>, ProviderError> {
        let params = [("query", name.to_string())];
        let documents = self.keyword(&params).await?;
        Ok(into_geocoded(name, documents))
    }
}

fn parse_keyword_response(body: Value) -> Result<Vec<KeywordDocument>, ProviderError> {
    serde_json::from_value::<KeywordResponse>(body)
        .map(|response| response.documents)
        .map_err(|err| ProviderError::Contract {
            service: SERVICE,
            message: err.to_string(),
        })
}

fn into_place_row(doc: KeywordDocument) -> PlaceRow {
    PlaceRow {
        name: doc.place_name,
        address: doc.address_name,
        category: doc.category_name,
        distance: doc.distance,
        rating: doc.rating,
    }
}

// Documents without usable coordinates are skipped.
fn into_geocoded(name: &str, documents: Vec<KeywordDocument>) -> Vec<GeocodedPlace> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let longitude = doc.x.as_ref().and_then(coerce_f64)?;
            let latitude = doc.y.as_ref().and_then(coerce_f64)?;
            Some(GeocodedPlace {
                name: doc.place_name.unwrap_or_else(|| name.to_string()),
                latitude,
                longitude,
            })
        })
        .collect()
}
