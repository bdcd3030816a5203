//! Thin HTTP client for the Timefold API.

use anyhow::{bail, Context};
use serde_json::Value;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, access_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token,
        }
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let mut request = self.http.post(format!("{}{path}", self.base_url)).json(body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        Self::unwrap_response(request.send().await.context("sending request")?).await
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let mut request = self.http.get(format!("{}{path}", self.base_url));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        Self::unwrap_response(request.send().await.context("sending request")?).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        let mut request = self.http.delete(format!("{}{path}", self.base_url));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        Self::unwrap_response(request.send().await.context("sending request")?).await
    }

    async fn unwrap_response(response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .unwrap_or_else(|_| Value::String("<non-JSON response>".into()));
        if !status.is_success() {
            let detail = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("server returned {status}: {detail}");
        }
        Ok(body)
    }
}
