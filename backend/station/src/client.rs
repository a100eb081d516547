use anyhow::{Context, Error, anyhow};
use readings::{
    InspectionRecord, InspectionStats, Submission,
    account::{Credentials, Registration, Session},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_API: &str = "http://127.0.0.1:5000";

/// HTTP client for the inspection API.
///
/// The token, when present, is attached to each request individually.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(registration)
            .send()
            .await
            .context("Register request failed")?;

        parse(response).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .context("Login request failed")?;

        parse(response).await
    }

    pub async fn submit(&self, submission: &Submission) -> Result<InspectionRecord, Error> {
        let response = self
            .authorized(self.http.post(self.url("/api/inspections")))
            .json(submission)
            .send()
            .await
            .context("Submit request failed")?;

        parse(response).await
    }

    pub async fn list(&self) -> Result<Vec<InspectionRecord>, Error> {
        let response = self
            .authorized(self.http.get(self.url("/api/inspections")))
            .send()
            .await
            .context("List request failed")?;

        parse(response).await
    }

    pub async fn stats(&self) -> Result<InspectionStats, Error> {
        let response = self
            .authorized(self.http.get(self.url("/api/inspections/stats")))
            .send()
            .await
            .context("Stats request failed")?;

        parse(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<String, Error> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/api/inspections/{id}"))))
            .send()
            .await
            .context("Delete request failed")?;

        let body: Value = parse(response).await?;

        Ok(body["message"].as_str().unwrap_or_default().to_string())
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("{status}: {}", server_message(&body)));
    }

    response
        .json()
        .await
        .with_context(|| format!("Unexpected response body ({status})"))
}

/// The server's `{"message": ...}` text, or the raw body when it has none.
fn server_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
