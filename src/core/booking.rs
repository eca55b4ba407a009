use crate::domain::model::{
    Availability, Booking, BookingRequest, BookingType, BookingWindow, WindowQuery,
};
use crate::domain::ports::BookingService;
use crate::utils::error::{CargoError, Result};
use crate::utils::validation::{validate_positive_amount, validate_zip_code};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// 每次送出產生新的冪等鍵，不可重複使用
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

pub fn validate_window_query(query: &WindowQuery, today: NaiveDate) -> Result<()> {
    validate_positive_amount("invalid weight", query.estimated_weight_lbs)?;

    if query.date < today {
        return Err(CargoError::validation("date is in the past"));
    }

    if let Some(zip) = &query.zip_code {
        validate_zip_code(zip)?;
    }

    Ok(())
}

/// 客戶在預約表單中選定的內容
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub window: BookingWindow,
    pub booking_type: BookingType,
    pub address: String,
    pub weight_lbs: f64,
    pub notes: Option<String>,
}

impl BookingDraft {
    fn validate(&self) -> Result<()> {
        validate_positive_amount("invalid weight", self.weight_lbs)?;

        if self.address.trim().is_empty() {
            return Err(CargoError::validation("address is required"));
        }

        if self.window.end <= self.window.start {
            return Err(CargoError::validation("time window ends before it starts"));
        }

        if self.weight_lbs > self.window.remaining_capacity_lbs {
            return Err(CargoError::validation(format!(
                "weight exceeds remaining capacity of {} lbs for this window",
                self.window.remaining_capacity_lbs
            )));
        }

        Ok(())
    }

    fn to_request(&self, idempotency_key: String) -> BookingRequest {
        BookingRequest {
            window_start: self.window.start,
            window_end: self.window.end,
            booking_type: self.booking_type,
            address: self.address.trim().to_string(),
            weight_lbs: self.weight_lbs,
            notes: self
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            idempotency_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Confirmed(Booking),
    /// 時段已被佔用；`alternatives` 為重新查詢的可用時段
    WindowTaken {
        message: String,
        alternatives: Availability,
    },
}

#[derive(Clone)]
pub struct BookingFlow {
    service: Arc<dyn BookingService>,
}

impl BookingFlow {
    pub fn new(service: Arc<dyn BookingService>) -> Self {
        Self { service }
    }

    pub async fn available_windows(&self, query: &WindowQuery, today: NaiveDate) -> Result<Availability> {
        validate_window_query(query, today)?;

        let availability = self.service.list_windows(query).await?;
        match &availability {
            Availability::Available { windows } => {
                tracing::info!("🗓️ {} windows available on {}", windows.len(), query.date)
            }
            Availability::Unavailable { reason, .. } => {
                tracing::info!("🚫 No windows on {}: {}", query.date, reason)
            }
        }
        Ok(availability)
    }

    /// 以新的冪等鍵送出一次；衝突時不重試，改回傳最新可用時段
    pub async fn submit(&self, draft: &BookingDraft, query: &WindowQuery) -> Result<BookingOutcome> {
        draft.validate()?;

        let request = draft.to_request(new_idempotency_key());
        tracing::debug!("Submitting booking with idempotency key {}", request.idempotency_key);

        match self.service.create_booking(&request).await {
            Ok(booking) => {
                tracing::info!("✅ Booking {} created ({:?})", booking.id, booking.status);
                Ok(BookingOutcome::Confirmed(booking))
            }
            Err(CargoError::ConflictError { message }) => {
                tracing::warn!("⚠️ Window {} already taken: {}", draft.window.display, message);
                match self.service.list_windows(query).await {
                    Ok(alternatives) => Ok(BookingOutcome::WindowTaken {
                        message,
                        alternatives,
                    }),
                    Err(e) => {
                        // 重新查詢失敗時仍回報衝突，不能讓使用者重送同一時段
                        tracing::warn!("⚠️ Could not reload windows after conflict: {}", e);
                        Err(CargoError::conflict(message))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ServiceType;

    fn query(date: NaiveDate) -> WindowQuery {
        WindowQuery {
            date,
            estimated_weight_lbs: 40.0,
            booking_type: BookingType::Pickup,
            service_type: ServiceType::Standard,
            zip_code: Some("33166".to_string()),
        }
    }

    #[test]
    fn test_idempotency_keys_are_unique() {
        assert_ne!(new_idempotency_key(), new_idempotency_key());
    }

    #[test]
    fn test_window_query_rejects_past_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert!(validate_window_query(&query(today), today).is_ok());
        assert!(validate_window_query(&query(yesterday), today).is_err());
    }

    #[test]
    fn test_window_query_rejects_bad_zip() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let mut q = query(today);
        q.zip_code = Some("3316".to_string());
        assert!(validate_window_query(&q, today).is_err());
    }
}
