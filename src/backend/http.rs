use crate::backend::ConfigBackend;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{
    ApiConfigResponse, ProviderId, RemoteError, SaveConfigResponse, SaveRequest,
    TestConnectionResult,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const CONFIG_PATH: &str = "/auth/config";
const TEST_DIFY_PATH: &str = "/auth/test-connection/dify";
const TEST_GENERIC_LLM_PATH: &str = "/auth/test-connection/generic-llm";
const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiEnvelope<T> {
    Data { data: T },
    Error { error: RemoteError },
}

#[derive(Debug, Serialize)]
struct TestDifyBody<'a> {
    base_url: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct TestGenericLlmBody<'a> {
    base_url: &'a str,
    api_key: &'a str,
    provider: ProviderId,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpBackend {
    pub fn new(cfg: &AppConfig, session_token: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.backend_url.trim_end_matches('/').to_string(),
            session_token,
        })
    }

    fn correlation_id() -> String {
        format!("cid-{}", Uuid::new_v4().simple())
    }

    fn require_session(&self) -> Result<(), AppError> {
        match &self.session_token {
            Some(_) => Ok(()),
            None => Err(AppError::NotAuthenticated),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let correlation_id = Self::correlation_id();
        debug!(%method, path, correlation_id = %correlation_id, "backend request");
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(CORRELATION_HEADER, correlation_id);
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, AppError> {
        let response = req.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().await?;
        decode_response(status, content_type.as_deref(), &body)
    }
}

/// Decodes the `{ data }` / `{ error }` envelope used by every endpoint.
fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, AppError> {
    if !content_type.is_some_and(|ct| ct.contains("application/json")) {
        warn!(%status, "backend returned a non-JSON response");
        return Err(AppError::Remote(RemoteError {
            code: "INVALID_RESPONSE".into(),
            message: format!("server returned a non-JSON response: {status}"),
        }));
    }

    let envelope = serde_json::from_slice::<ApiEnvelope<T>>(body).map_err(|e| {
        warn!(%status, error = %e, "backend response did not match the envelope");
        AppError::Remote(RemoteError {
            code: "INVALID_RESPONSE".into(),
            message: format!("server returned an unexpected response: {status}"),
        })
    })?;

    match envelope {
        ApiEnvelope::Data { data } => Ok(data),
        ApiEnvelope::Error { error } if error.code == "UNAUTHORIZED" => {
            Err(AppError::Unauthorized(error.message))
        }
        ApiEnvelope::Error { error } => {
            debug!(%status, code = %error.code, "backend returned an error");
            Err(AppError::Remote(error))
        }
    }
}

#[async_trait]
impl ConfigBackend for HttpBackend {
    async fn load_config(&self) -> Result<ApiConfigResponse, AppError> {
        self.require_session()?;
        Self::send(self.request(Method::GET, CONFIG_PATH)).await
    }

    async fn test_dify(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<TestConnectionResult, AppError> {
        let req = self
            .request(Method::POST, TEST_DIFY_PATH)
            .json(&TestDifyBody { base_url, api_key });
        Self::send(req).await
    }

    async fn test_generic_llm(
        &self,
        base_url: &str,
        api_key: &str,
        provider: ProviderId,
    ) -> Result<TestConnectionResult, AppError> {
        let req = self
            .request(Method::POST, TEST_GENERIC_LLM_PATH)
            .json(&TestGenericLlmBody {
                base_url,
                api_key,
                provider,
            });
        Self::send(req).await
    }

    async fn save_config(&self, request: &SaveRequest) -> Result<SaveConfigResponse, AppError> {
        self.require_session()?;
        Self::send(self.request(Method::POST, CONFIG_PATH).json(request)).await
    }
}
