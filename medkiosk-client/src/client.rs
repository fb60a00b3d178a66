//! Blocking HTTP client for the data service.

use crate::error::ClientError;
use crate::models::{Assessment, ItemList, Patient, Provider, RfidTag};
use crate::service::DataService;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `https://host/ords/c85/pihealth/`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("medkiosk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`DataService`] over REST/JSON.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    http: Client,
    base_url: String,
}

impl HttpDataService {
    /// Creates a client. No request is made until the first call.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    /// Sends a request and returns the body of a successful response.
    fn send(&self, resource: &str, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(resource));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(resource, status = status.as_u16(), bytes = body.len(), "data service response");
        Ok(body)
    }

    fn get<T: DeserializeOwned>(&self, resource: &str, path: &str) -> Result<T, ClientError> {
        let body = self.send(resource, self.http.get(self.url(path)))?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl DataService for HttpDataService {
    fn post_assessments(&self) -> Result<(), ClientError> {
        let request = self.http.post(self.url("assessments")).json(&json!({}));
        self.send("assessments", request)?;
        Ok(())
    }

    fn rfid_tag(&self, code: &str) -> Result<RfidTag, ClientError> {
        self.get(&format!("card {code}"), &format!("rfidtag/{code}"))
    }

    fn provider(&self, provider_id: u64) -> Result<Provider, ClientError> {
        self.get(
            &format!("provider {provider_id}"),
            &format!("provider/{provider_id}"),
        )
    }

    fn patients(&self, provider_id: u64) -> Result<Vec<Patient>, ClientError> {
        let list: ItemList<Patient> = self.get(
            &format!("patients of provider {provider_id}"),
            &format!("patients/{provider_id}"),
        )?;
        Ok(list.items)
    }

    fn assessments(&self, patient_id: u64) -> Result<Vec<Assessment>, ClientError> {
        let list: ItemList<Assessment> = self.get(
            &format!("assessments of patient {patient_id}"),
            &format!("assessments/{patient_id}"),
        )?;
        Ok(list.items)
    }

    fn mark_reviewed(&self, assessment_id: u64) -> Result<(), ClientError> {
        let request = self
            .http
            .put(self.url(&format!("provider_reviewed/{assessment_id}")))
            .json(&json!({}));
        self.send(&format!("assessment {assessment_id}"), request)?;
        Ok(())
    }
}
