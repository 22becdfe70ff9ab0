//! HTTP plant source for the plants API

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value as JsonValue;

use super::{PlantSource, SourceError};
use crate::config::ExtractSection;

/// Fetches plants from `<base_url><plant_id>`
#[derive(Debug, Clone)]
pub struct HttpPlantSource {
    client: Client,
    base_url: String,
}

impl HttpPlantSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::HttpError(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &ExtractSection) -> Result<Self, SourceError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self, plant_id: u32) -> String {
        format!("{}{}", self.base_url, plant_id)
    }
}

impl PlantSource for HttpPlantSource {
    fn fetch(&self, plant_id: u32) -> Result<Option<JsonValue>, SourceError> {
        let url = self.url(plant_id);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SourceError::HttpError(format!("GET {}: {}", url, e)))?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        response
            .json::<JsonValue>()
            .map(Some)
            .map_err(|e| SourceError::DecodeError(format!("GET {}: {}", url, e)))
    }
}
