//! Lambda 與 CLI 共用的請求處理；一律回傳 [`Envelope`]，不讓呼叫本身失敗

use crate::adapters::SupabaseClient;
use crate::core::booking::BookingFlow;
use crate::core::catalog::DestinationCatalog;
use crate::core::quote::QuoteService;
use crate::core::rates::{PricingPolicy, RateCalculator};
use crate::domain::envelope::Envelope;
use crate::domain::model::{Availability, CalculatedRate, QuoteRequest, WindowQuery};
use crate::domain::ports::{ConfigProvider, DestinationRepository};
use crate::utils::error::{CargoError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;

fn parse_body<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    // API Gateway 代理會把 body 包成 JSON 字串
    let payload = match payload {
        serde_json::Value::Object(mut map) if map.get("body").is_some_and(|b| b.is_string()) => {
            let body = map.remove("body").unwrap_or_default();
            serde_json::from_str(body.as_str().unwrap_or_default())
                .map_err(|e| CargoError::validation(format!("invalid request body: {}", e)))?
        }
        other => other,
    };

    serde_json::from_value(payload)
        .map_err(|e| CargoError::validation(format!("invalid request body: {}", e)))
}

/// 有設定目錄檔就用目錄檔，否則使用資料庫
pub fn destination_repository<C: ConfigProvider + ?Sized>(
    config: &C,
) -> Result<Arc<dyn DestinationRepository>> {
    match config.catalog_path() {
        Some(path) => {
            tracing::info!("📁 Using destination catalog at {}", path);
            Ok(Arc::new(DestinationCatalog::from_csv_path(path)?))
        }
        None => Ok(Arc::new(SupabaseClient::from_config(config)?)),
    }
}

pub fn quote_service<C: ConfigProvider + ?Sized>(
    config: &C,
    pricing: PricingPolicy,
) -> Result<QuoteService> {
    Ok(QuoteService::new(
        destination_repository(config)?,
        RateCalculator::new(pricing),
    ))
}

pub async fn handle_calculate_rate(
    service: &QuoteService,
    payload: serde_json::Value,
) -> Envelope<CalculatedRate> {
    let result = async {
        let request: QuoteRequest = parse_body(payload)?;
        service.quote(&request).await
    }
    .await;
    Envelope::from_result(result)
}

pub async fn handle_available_windows(
    flow: &BookingFlow,
    payload: serde_json::Value,
    today: NaiveDate,
) -> Envelope<Availability> {
    let result = async {
        let query: WindowQuery = parse_body(payload)?;
        flow.available_windows(&query, today).await
    }
    .await;
    Envelope::from_result(result)
}
