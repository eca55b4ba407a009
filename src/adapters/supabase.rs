//! 託管資料庫轉接器：資料表走 PostgREST (`/rest/v1/<table>`)，
//! 容量服務走 edge functions (`/functions/v1/<name>`)。資料列逐筆解碼，格式錯誤者略過。

use crate::core::catalog::{accept_rows, sort_for_listing, DestinationRow};
use crate::domain::envelope::Envelope;
use crate::domain::model::{
    Availability, Booking, BookingRequest, BookingWindow, Destination, QuoteRecord,
    UnavailableReason, WindowQuery,
};
use crate::domain::ports::{BookingService, ConfigProvider, DestinationRepository, QuoteStore};
use crate::utils::error::{CargoError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("caribe-cargo/", env!("CARGO_PKG_VERSION"));
const WINDOWS_FUNCTION: &str = "get-available-windows";
const CREATE_BOOKING_FUNCTION: &str = "create-booking";

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_url: Url,
    functions_url: Url,
    api_key: String,
    access_token: Option<String>,
}

fn with_trailing_slash(url: &str) -> Result<Url> {
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    };
    Url::parse(&normalized).map_err(|e| CargoError::InvalidConfigValueError {
        field: "supabase_url".to_string(),
        value: url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

impl SupabaseClient {
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let base = with_trailing_slash(project_url)?;
        let join = |path: &str| {
            base.join(path).map_err(|e| CargoError::ConfigError {
                message: format!("Cannot build {} URL: {}", path, e),
            })
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            rest_url: join("rest/v1/")?,
            functions_url: join("functions/v1/")?,
            api_key: api_key.to_string(),
            access_token: None,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.supabase_url(),
            config.supabase_key(),
            Duration::from_secs(config.request_timeout_seconds()),
        )
    }

    /// 將函式呼叫導向獨立部署的容量服務
    pub fn with_functions_url(mut self, functions_url: &str) -> Result<Self> {
        self.functions_url = with_trailing_slash(functions_url)?;
        Ok(self)
    }

    /// 以登入客戶身分呼叫，取代匿名金鑰
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_url.join(table).map_err(|e| CargoError::ConfigError {
            message: format!("Cannot build URL for table {}: {}", table, e),
        })
    }

    fn function_url(&self, name: &str) -> Result<Url> {
        self.functions_url.join(name).map_err(|e| CargoError::ConfigError {
            message: format!("Cannot build URL for function {}: {}", name, e),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    async fn fetch_destination_rows(&self, url: Url) -> Result<Vec<Destination>> {
        tracing::debug!("Making API request to: {}", url);
        let response = check_status(self.authorized(self.client.get(url)).send().await?).await?;

        let rows: Vec<serde_json::Value> = response.json().await?;
        let decoded = rows.into_iter().filter_map(|row| {
            serde_json::from_value::<DestinationRow>(row)
                .map_err(|e| tracing::warn!("⚠️ Skipping undecodable destination row: {}", e))
                .ok()
        });
        Ok(accept_rows(decoded))
    }

    async fn call_function<B, T>(&self, name: &str, body: &B, idempotency_key: Option<&str>) -> Result<T>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: serde::de::DeserializeOwned,
    {
        let url = self.function_url(name)?;
        tracing::debug!("Invoking function {}", url);

        let mut request = self.authorized(self.client.post(url)).json(body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = check_status(request.send().await?).await?;
        let envelope: Envelope<T> = response.json().await?;
        envelope.into_result().map_err(|body| CargoError::UpstreamError {
            status: StatusCode::OK.as_u16(),
            message: body.message,
        })
    }
}

/// 從各種格式的錯誤回應中取出可讀訊息
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            value.pointer("/error/message"),
            value.pointer("/message"),
            value.pointer("/error"),
            value.pointer("/msg"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(text) = candidate.as_str() {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    Err(match status {
        StatusCode::CONFLICT => CargoError::conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => CargoError::validation(message),
        _ => CargoError::UpstreamError {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl DestinationRepository for SupabaseClient {
    async fn list_active_destinations(&self) -> Result<Vec<Destination>> {
        let mut url = self.table_url("destinations")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("is_active", "eq.true")
            .append_pair("order", "country_name.asc,city_name.asc");

        let mut destinations: Vec<Destination> = self
            .fetch_destination_rows(url)
            .await?
            .into_iter()
            .filter(|d| d.is_active)
            .collect();
        sort_for_listing(&mut destinations);
        tracing::info!("📦 Loaded {} active destinations", destinations.len());
        Ok(destinations)
    }

    async fn find_active_destination(&self, id: &str) -> Result<Option<Destination>> {
        let mut url = self.table_url("destinations")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{}", id))
            .append_pair("is_active", "eq.true")
            .append_pair("limit", "1");

        Ok(self
            .fetch_destination_rows(url)
            .await?
            .into_iter()
            .find(|d| d.id == id && d.is_active))
    }
}

#[async_trait]
impl QuoteStore for SupabaseClient {
    async fn save_quote(&self, quote: &QuoteRecord) -> Result<QuoteRecord> {
        let url = self.table_url("quotes")?;
        let request = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&[quote]);

        let response = check_status(request.send().await?).await?;
        let mut saved: Vec<QuoteRecord> = response.json().await?;
        if saved.is_empty() {
            return Err(CargoError::UpstreamError {
                status: StatusCode::OK.as_u16(),
                message: "quote insert returned no rows".to_string(),
            });
        }
        Ok(saved.swap_remove(0))
    }
}

#[derive(Debug, Deserialize)]
struct UnavailablePayload {
    reason: UnavailableReason,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindowsPayload {
    #[serde(default)]
    windows: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    unavailable: Option<UnavailablePayload>,
}

impl WindowsPayload {
    fn into_availability(self) -> Result<Availability> {
        if let Some(unavailable) = self.unavailable {
            return Ok(Availability::Unavailable {
                reason: unavailable.reason,
                message: unavailable.message,
            });
        }

        let raw = self.windows.ok_or_else(|| CargoError::UpstreamError {
            status: StatusCode::OK.as_u16(),
            message: "availability response had neither windows nor a reason".to_string(),
        })?;

        let windows = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<BookingWindow>(value) {
                Ok(window) if window.end > window.start => Some(window),
                Ok(window) => {
                    tracing::warn!("⚠️ Skipping window '{}' with inverted times", window.display);
                    None
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping malformed window: {}", e);
                    None
                }
            })
            .collect();
        Ok(Availability::Available { windows })
    }
}

#[async_trait]
impl BookingService for SupabaseClient {
    async fn list_windows(&self, query: &WindowQuery) -> Result<Availability> {
        let payload: WindowsPayload = self.call_function(WINDOWS_FUNCTION, query, None).await?;
        payload.into_availability()
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking> {
        self.call_function(
            CREATE_BOOKING_FUNCTION,
            request,
            Some(request.idempotency_key.as_str()),
        )
        .await
    }
}
