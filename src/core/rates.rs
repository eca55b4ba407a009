//! 運費計算，全為純函式：相同輸入必得相同的 [`CalculatedRate`]。
//! 級距費率套用於整個計費重量，因此 201 磅可能比 200 磅便宜。

use crate::domain::model::{
    CalculatedRate, Destination, Dimensions, QuoteRequest, RateBreakdown, ServiceType,
    TransitEstimate, WeightTier,
};
use crate::utils::error::{CargoError, Result};
use crate::utils::validation::{
    is_non_negative_amount, validate_non_negative_amount, validate_positive_amount, Validate,
};
use serde::{Deserialize, Serialize};

pub const DIMENSIONAL_DIVISOR: f64 = 166.0;
pub const INSURANCE_FREE_COVERAGE: f64 = 100.0;
pub const INSURANCE_RATE: f64 = 0.075;
pub const INSURANCE_MINIMUM: f64 = 15.0;

/// 運費模型的可調參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// 每計費磅對應的立方英吋
    pub dimensional_divisor: f64,
    /// 免費保額
    pub insurance_free_coverage: f64,
    /// 超出免費保額部分的費率（每 $100 收 $7.50）
    pub insurance_rate: f64,
    pub insurance_minimum: f64,
    /// 要求特殊處理時加收的固定費用
    pub handling_fee: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            dimensional_divisor: DIMENSIONAL_DIVISOR,
            insurance_free_coverage: INSURANCE_FREE_COVERAGE,
            insurance_rate: INSURANCE_RATE,
            insurance_minimum: INSURANCE_MINIMUM,
            handling_fee: 0.0,
        }
    }
}

impl Validate for PricingPolicy {
    fn validate(&self) -> Result<()> {
        if !(self.dimensional_divisor.is_finite() && self.dimensional_divisor > 0.0) {
            return Err(CargoError::InvalidConfigValueError {
                field: "pricing.dimensional_divisor".to_string(),
                value: self.dimensional_divisor.to_string(),
                reason: "Divisor must be a positive number".to_string(),
            });
        }

        let amounts = [
            ("pricing.insurance_free_coverage", self.insurance_free_coverage),
            ("pricing.insurance_rate", self.insurance_rate),
            ("pricing.insurance_minimum", self.insurance_minimum),
            ("pricing.handling_fee", self.handling_fee),
        ];
        for (field, value) in amounts {
            if !is_non_negative_amount(value) {
                return Err(CargoError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Amount cannot be negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct RateCalculator {
    policy: PricingPolicy,
}

impl RateCalculator {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// 查詢目的地之前必須通過的輸入檢查
    pub fn validate_request(request: &QuoteRequest) -> Result<()> {
        validate_positive_amount("invalid weight", request.weight)?;

        if let Some(dimensions) = &request.dimensions {
            for side in dimensions.sides().into_iter().flatten() {
                validate_non_negative_amount("invalid dimensions", side)?;
            }
        }

        if let Some(declared) = request.declared_value {
            validate_non_negative_amount("invalid declared value", declared)?;
        }

        Ok(())
    }

    pub fn dimensional_weight(&self, dimensions: Option<&Dimensions>) -> Option<f64> {
        dimensions
            .and_then(Dimensions::volume)
            .map(|volume| volume / self.policy.dimensional_divisor)
    }

    pub fn billable_weight(&self, weight: f64, dimensions: Option<&Dimensions>) -> f64 {
        weight.max(self.dimensional_weight(dimensions).unwrap_or(0.0))
    }

    pub fn insurance_cost(&self, declared_value: Option<f64>) -> f64 {
        match declared_value {
            Some(value) if value > self.policy.insurance_free_coverage => {
                let computed = (value - self.policy.insurance_free_coverage) * self.policy.insurance_rate;
                round_cents(computed.max(self.policy.insurance_minimum))
            }
            _ => 0.0,
        }
    }

    /// 快遞上下限各減一天（下限至少 1、上限至少 2），但不會比標準更慢或更寬
    pub fn transit_estimate(destination: &Destination, service_type: ServiceType) -> TransitEstimate {
        let lo = destination.transit_days_min.min(destination.transit_days_max);
        let hi = destination.transit_days_min.max(destination.transit_days_max);

        match service_type {
            ServiceType::Standard => TransitEstimate {
                min: lo.max(1),
                max: hi.max(1),
            },
            ServiceType::Express => {
                let max = hi.saturating_sub(1).max(2).min(hi.max(1));
                let min = lo
                    .saturating_sub(1)
                    .max(1)
                    .max(max.saturating_sub(hi - lo))
                    .min(max);
                TransitEstimate { min, max }
            }
        }
    }

    pub fn calculate(&self, request: &QuoteRequest, destination: &Destination) -> Result<CalculatedRate> {
        Self::validate_request(request)?;

        if !destination.is_active || destination.id != request.destination_id {
            return Err(CargoError::lookup("unknown destination"));
        }

        let dimensional_weight = self.dimensional_weight(request.dimensions.as_ref());
        let billable_weight = request.weight.max(dimensional_weight.unwrap_or(0.0));
        let tier = WeightTier::for_weight(billable_weight);
        let rate_per_lb = destination.rate_for_tier(tier);

        let base_cost = round_cents(billable_weight * rate_per_lb);
        let express_surcharge = match request.service_type {
            ServiceType::Express => {
                round_cents(base_cost * destination.express_surcharge_percent.max(0.0) / 100.0)
            }
            ServiceType::Standard => 0.0,
        };
        let handling_fee = if request.special_handling {
            round_cents(self.policy.handling_fee)
        } else {
            0.0
        };
        let insurance_cost = self.insurance_cost(request.declared_value);
        let total_cost = round_cents(base_cost + express_surcharge + handling_fee + insurance_cost);

        // 極大輸入會溢位成 inf，序列化後變成 null
        let amounts = [
            billable_weight,
            base_cost,
            express_surcharge,
            handling_fee,
            insurance_cost,
            total_cost,
        ];
        if amounts.iter().any(|amount| !amount.is_finite()) {
            return Err(CargoError::validation("shipment values are out of range"));
        }

        let transit_days = Self::transit_estimate(destination, request.service_type);

        tracing::debug!(
            destination = %destination.airport_code,
            billable_weight,
            tier = tier.label(),
            total_cost,
            "calculated rate"
        );

        Ok(CalculatedRate {
            actual_weight: request.weight,
            dimensional_weight,
            billable_weight,
            rate_per_lb,
            service_type: request.service_type,
            rate_breakdown: RateBreakdown {
                base_cost,
                express_surcharge,
                handling_fee,
                insurance_cost,
                total_cost,
            },
            transit_time: transit_days.to_string(),
            transit_days,
        })
    }
}
