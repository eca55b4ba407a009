use crate::core::rates::RateCalculator;
use crate::domain::model::{CalculatedRate, QuoteRecord, QuoteRequest};
use crate::domain::ports::{DestinationRepository, QuoteStore};
use crate::utils::error::{CargoError, Result};
use std::sync::Arc;

/// 驗證報價請求、查詢目的地並計價
#[derive(Clone)]
pub struct QuoteService {
    destinations: Arc<dyn DestinationRepository>,
    calculator: RateCalculator,
}

impl QuoteService {
    pub fn new(destinations: Arc<dyn DestinationRepository>, calculator: RateCalculator) -> Self {
        Self {
            destinations,
            calculator,
        }
    }

    pub fn calculator(&self) -> &RateCalculator {
        &self.calculator
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<CalculatedRate> {
        // 先驗證輸入，驗證失敗時不查詢目的地
        RateCalculator::validate_request(request)?;

        if request.destination_id.trim().is_empty() {
            return Err(CargoError::lookup("unknown destination"));
        }

        let destination = self
            .destinations
            .find_active_destination(&request.destination_id)
            .await?
            .ok_or_else(|| CargoError::lookup("unknown destination"))?;

        tracing::info!(
            "💲 Quoting {} lbs to {} ({})",
            request.weight,
            destination.display_name(),
            request.service_type
        );

        self.calculator.calculate(request, &destination)
    }

    /// 計價並將結果存成報價紀錄
    pub async fn quote_and_save(
        &self,
        request: &QuoteRequest,
        store: &dyn QuoteStore,
        customer_id: Option<String>,
    ) -> Result<(CalculatedRate, QuoteRecord)> {
        let rate = self.quote(request).await?;
        let record = QuoteRecord::new(request, &rate, customer_id);
        let saved = store.save_quote(&record).await?;
        tracing::info!("📝 Saved quote {}", saved.id.as_deref().unwrap_or("<unassigned>"));
        Ok((rate, saved))
    }
}
