use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::CargoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Standard,
    Express,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Standard => "standard",
            ServiceType::Express => "express",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = CargoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ServiceType::Standard),
            "express" => Ok(ServiceType::Express),
            other => Err(CargoError::validation(format!(
                "unknown service type '{}'",
                other
            ))),
        }
    }
}

/// 空運目的地與其四級費率表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub country_name: String,
    pub city_name: String,
    pub airport_code: String,
    pub rate_per_lb_1_50: f64,
    pub rate_per_lb_51_100: f64,
    pub rate_per_lb_101_200: f64,
    pub rate_per_lb_201_plus: f64,
    pub express_surcharge_percent: f64,
    pub transit_days_min: u32,
    pub transit_days_max: u32,
    pub is_active: bool,
}

impl Destination {
    /// 計費重量所屬級距的每磅費率
    pub fn rate_for_tier(&self, tier: WeightTier) -> f64 {
        match tier {
            WeightTier::UpTo50 => self.rate_per_lb_1_50,
            WeightTier::UpTo100 => self.rate_per_lb_51_100,
            WeightTier::UpTo200 => self.rate_per_lb_101_200,
            WeightTier::Over200 => self.rate_per_lb_201_plus,
        }
    }

    pub fn display_name(&self) -> String {
        format!(
            "{}, {} ({})",
            self.city_name, self.country_name, self.airport_code
        )
    }
}

/// 費率重量級距，上限包含在內
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTier {
    UpTo50,
    UpTo100,
    UpTo200,
    Over200,
}

impl WeightTier {
    pub const ALL: [WeightTier; 4] = [
        WeightTier::UpTo50,
        WeightTier::UpTo100,
        WeightTier::UpTo200,
        WeightTier::Over200,
    ];

    pub fn for_weight(billable_weight: f64) -> Self {
        if billable_weight <= 50.0 {
            WeightTier::UpTo50
        } else if billable_weight <= 100.0 {
            WeightTier::UpTo100
        } else if billable_weight <= 200.0 {
            WeightTier::UpTo200
        } else {
            WeightTier::Over200
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightTier::UpTo50 => "1-50 lbs",
            WeightTier::UpTo100 => "51-100 lbs",
            WeightTier::UpTo200 => "101-200 lbs",
            WeightTier::Over200 => "201+ lbs",
        }
    }
}

/// 包裹尺寸（英吋），任一邊可省略
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
        }
    }

    /// 立方英吋；三邊皆有且大於 0 才計算
    pub fn volume(&self) -> Option<f64> {
        match (self.length, self.width, self.height) {
            (Some(l), Some(w), Some(h)) if l > 0.0 && w > 0.0 && h > 0.0 => Some(l * w * h),
            _ => None,
        }
    }

    pub fn sides(&self) -> [Option<f64>; 3] {
        [self.length, self.width, self.height]
    }
}

/// 運費計算請求內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub weight: f64,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    pub destination_id: String,
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub declared_value: Option<f64>,
    #[serde(default)]
    pub special_handling: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBreakdown {
    pub base_cost: f64,
    pub express_surcharge: f64,
    pub handling_fee: f64,
    pub insurance_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitEstimate {
    pub min: u32,
    pub max: u32,
}

impl TransitEstimate {
    pub fn width(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }
}

impl fmt::Display for TransitEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{} business days", self.min)
        } else {
            write!(f, "{}-{} business days", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedRate {
    pub actual_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dimensional_weight: Option<f64>,
    pub billable_weight: f64,
    pub rate_per_lb: f64,
    pub service_type: ServiceType,
    pub rate_breakdown: RateBreakdown,
    pub transit_time: String,
    pub transit_days: TransitEstimate,
}

/// 存於 `quotes` 資料表的報價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_id: Option<String>,
    pub destination_id: String,
    pub weight: f64,
    pub billable_weight: f64,
    pub service_type: ServiceType,
    #[serde(default)]
    pub declared_value: Option<f64>,
    pub total_cost: f64,
    pub transit_time: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuoteRecord {
    pub fn new(request: &QuoteRequest, rate: &CalculatedRate, customer_id: Option<String>) -> Self {
        Self {
            id: None,
            customer_id,
            destination_id: request.destination_id.clone(),
            weight: request.weight,
            billable_weight: rate.billable_weight,
            service_type: rate.service_type,
            declared_value: request.declared_value,
            total_cost: rate.rate_breakdown.total_cost,
            transit_time: rate.transit_time.clone(),
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Pickup,
    DropOff,
}

impl FromStr for BookingType {
    type Err = CargoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pickup" => Ok(BookingType::Pickup),
            "drop_off" | "dropoff" => Ok(BookingType::DropOff),
            other => Err(CargoError::validation(format!(
                "unknown booking type '{}'",
                other
            ))),
        }
    }
}

/// 送往外部時段服務的查詢
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowQuery {
    pub date: NaiveDate,
    pub estimated_weight_lbs: f64,
    pub booking_type: BookingType,
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub display: String,
    pub remaining_capacity_lbs: f64,
    pub assigned_vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_travel_time_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    OutOfServiceArea,
    Closed,
    NoCapacity,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::OutOfServiceArea => "address is outside the service area",
            UnavailableReason::Closed => "we are closed on the selected date",
            UnavailableReason::NoCapacity => "no vehicle capacity left for that weight",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Available {
        windows: Vec<BookingWindow>,
    },
    Unavailable {
        reason: UnavailableReason,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        message: Option<String>,
    },
}

impl Availability {
    pub fn windows(&self) -> &[BookingWindow] {
        match self {
            Availability::Available { windows } => windows,
            Availability::Unavailable { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub booking_type: BookingType,
    pub address: String,
    pub weight_lbs: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub status: BookingStatus,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub address: String,
    pub weight_lbs: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_vehicle: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
