//! 各目的地的費率表與試算範例

use crate::core::rates::RateCalculator;
use crate::domain::model::{
    Destination, QuoteRequest, ServiceType, TransitEstimate, WeightTier,
};
use crate::utils::error::Result;
use serde::Serialize;

pub const EXAMPLE_WEIGHTS: [f64; 4] = [10.0, 75.0, 150.0, 250.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRow {
    pub tier: WeightTier,
    pub label: &'static str,
    pub rate_per_lb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkedExample {
    pub weight: f64,
    pub rate_per_lb: f64,
    pub standard_total: f64,
    pub express_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateCard {
    pub destination_id: String,
    pub destination: String,
    pub express_surcharge_percent: f64,
    pub tiers: Vec<TierRow>,
    pub examples: Vec<WorkedExample>,
    pub standard_transit: TransitEstimate,
    pub express_transit: TransitEstimate,
}

pub fn build_rate_card(
    calculator: &RateCalculator,
    destination: &Destination,
    example_weights: &[f64],
) -> Result<RateCard> {
    let tiers = WeightTier::ALL
        .iter()
        .map(|tier| TierRow {
            tier: *tier,
            label: tier.label(),
            rate_per_lb: destination.rate_for_tier(*tier),
        })
        .collect();

    let mut examples = Vec::with_capacity(example_weights.len());
    for &weight in example_weights {
        let mut request = QuoteRequest {
            weight,
            dimensions: None,
            destination_id: destination.id.clone(),
            service_type: ServiceType::Standard,
            declared_value: None,
            special_handling: false,
        };
        let standard = calculator.calculate(&request, destination)?;
        request.service_type = ServiceType::Express;
        let express = calculator.calculate(&request, destination)?;

        examples.push(WorkedExample {
            weight,
            rate_per_lb: standard.rate_per_lb,
            standard_total: standard.rate_breakdown.total_cost,
            express_total: express.rate_breakdown.total_cost,
        });
    }

    Ok(RateCard {
        destination_id: destination.id.clone(),
        destination: destination.display_name(),
        express_surcharge_percent: destination.express_surcharge_percent,
        tiers,
        examples,
        standard_transit: RateCalculator::transit_estimate(destination, ServiceType::Standard),
        express_transit: RateCalculator::transit_estimate(destination, ServiceType::Express),
    })
}
