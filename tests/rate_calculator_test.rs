use caribe_cargo::core::rates::RateCalculator;
use caribe_cargo::domain::model::{Destination, Dimensions, QuoteRequest, ServiceType};
use caribe_cargo::CargoError;

fn destination(min_days: u32, max_days: u32) -> Destination {
    Destination {
        id: "dest-kin".to_string(),
        country_name: "Jamaica".to_string(),
        city_name: "Kingston".to_string(),
        airport_code: "KIN".to_string(),
        rate_per_lb_1_50: 4.50,
        rate_per_lb_51_100: 4.00,
        rate_per_lb_101_200: 3.50,
        rate_per_lb_201_plus: 3.00,
        express_surcharge_percent: 25.0,
        transit_days_min: min_days,
        transit_days_max: max_days,
        is_active: true,
    }
}

fn request(weight: f64, service_type: ServiceType) -> QuoteRequest {
    QuoteRequest {
        weight,
        dimensions: None,
        destination_id: "dest-kin".to_string(),
        service_type,
        declared_value: None,
        special_handling: false,
    }
}

#[test]
fn test_heavy_shipments_use_flat_top_tier() {
    let calc = RateCalculator::default();
    for weight in [200.5, 201.0, 350.0, 1200.0] {
        let rate = calc
            .calculate(&request(weight, ServiceType::Standard), &destination(3, 5))
            .unwrap();
        assert_eq!(rate.rate_per_lb, 3.00, "weight {}", weight);
        let expected = ((weight * 3.00) * 100.0_f64).round() / 100.0;
        assert_eq!(rate.rate_breakdown.base_cost, expected);
    }
}

#[test]
fn test_tier_discontinuity_at_200_lbs() {
    let calc = RateCalculator::default();
    let at_200 = calc
        .calculate(&request(200.0, ServiceType::Standard), &destination(3, 5))
        .unwrap();
    let at_201 = calc
        .calculate(&request(201.0, ServiceType::Standard), &destination(3, 5))
        .unwrap();
    assert_eq!(at_200.rate_breakdown.base_cost, 700.0);
    assert_eq!(at_201.rate_breakdown.base_cost, 603.0);
    assert!(at_201.rate_breakdown.total_cost < at_200.rate_breakdown.total_cost);
}

#[test]
fn test_dimensional_weight_drives_billable_weight() {
    let calc = RateCalculator::default();
    let mut req = request(5.0, ServiceType::Standard);
    req.dimensions = Some(Dimensions::new(24.0, 18.0, 12.0));

    let rate = calc.calculate(&req, &destination(3, 5)).unwrap();
    let dimensional = 24.0 * 18.0 * 12.0 / 166.0;
    assert_eq!(rate.dimensional_weight, Some(dimensional));
    assert_eq!(rate.billable_weight, dimensional);
    assert!(rate.billable_weight >= rate.actual_weight);
}

#[test]
fn test_zero_or_absent_dimensions_bill_actual_weight() {
    let calc = RateCalculator::default();

    let absent = calc
        .calculate(&request(5.0, ServiceType::Standard), &destination(3, 5))
        .unwrap();
    assert_eq!(absent.billable_weight, 5.0);
    assert_eq!(absent.dimensional_weight, None);

    let mut zero = request(5.0, ServiceType::Standard);
    zero.dimensions = Some(Dimensions::new(0.0, 0.0, 0.0));
    let zero = calc.calculate(&zero, &destination(3, 5)).unwrap();
    assert_eq!(zero.billable_weight, 5.0);
}

#[test]
fn test_small_volume_does_not_reduce_billable_weight() {
    let calc = RateCalculator::default();
    let mut req = request(30.0, ServiceType::Standard);
    req.dimensions = Some(Dimensions::new(10.0, 10.0, 10.0));
    let rate = calc.calculate(&req, &destination(3, 5)).unwrap();
    assert_eq!(rate.billable_weight, 30.0);
}

#[test]
fn test_insurance_minimum_applies_to_200_declared() {
    let calc = RateCalculator::default();
    let mut req = request(5.0, ServiceType::Standard);
    req.declared_value = Some(200.0);

    let rate = calc.calculate(&req, &destination(3, 5)).unwrap();
    assert_eq!(rate.rate_breakdown.base_cost, 22.50);
    assert_eq!(rate.rate_breakdown.insurance_cost, 15.00);
    assert_eq!(rate.rate_breakdown.express_surcharge, 0.0);
    assert_eq!(rate.rate_breakdown.total_cost, 37.50);
}

#[test]
fn test_declared_value_up_to_100_is_free() {
    let calc = RateCalculator::default();
    let mut req = request(5.0, ServiceType::Standard);
    req.declared_value = Some(100.0);
    let rate = calc.calculate(&req, &destination(3, 5)).unwrap();
    assert_eq!(rate.rate_breakdown.insurance_cost, 0.0);
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let calc = RateCalculator::default();
    let mut req = request(73.4, ServiceType::Express);
    req.dimensions = Some(Dimensions::new(30.0, 20.0, 15.0));
    req.declared_value = Some(640.0);

    let first = serde_json::to_vec(&calc.calculate(&req, &destination(4, 6)).unwrap()).unwrap();
    let second = serde_json::to_vec(&calc.calculate(&req, &destination(4, 6)).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_express_never_cheaper_than_standard() {
    let calc = RateCalculator::default();
    for weight in [0.5, 12.0, 50.0, 99.9, 150.0, 201.0, 480.0] {
        for declared in [None, Some(50.0), Some(900.0)] {
            let mut standard = request(weight, ServiceType::Standard);
            standard.declared_value = declared;
            let mut express = standard.clone();
            express.service_type = ServiceType::Express;

            let s = calc.calculate(&standard, &destination(3, 5)).unwrap();
            let e = calc.calculate(&express, &destination(3, 5)).unwrap();
            assert!(e.rate_breakdown.total_cost >= s.rate_breakdown.total_cost);
            assert!(s.rate_breakdown.total_cost >= s.rate_breakdown.base_cost);
            assert_eq!(s.rate_breakdown.express_surcharge, 0.0);
        }
    }
}

#[test]
fn test_invalid_weights_fail_validation() {
    let calc = RateCalculator::default();
    for weight in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let err = calc
            .calculate(&request(weight, ServiceType::Standard), &destination(3, 5))
            .unwrap_err();
        assert!(
            matches!(err, CargoError::ValidationError { ref message } if message == "invalid weight"),
            "weight {:?} gave {:?}",
            weight,
            err
        );
    }
}

#[test]
fn test_express_transit_never_wider_than_standard() {
    for min in 1..=8 {
        for max in min..=12 {
            let dest = destination(min, max);
            let standard = RateCalculator::transit_estimate(&dest, ServiceType::Standard);
            let express = RateCalculator::transit_estimate(&dest, ServiceType::Express);

            assert!(express.min >= 1 && express.max >= 1, "{}-{}", min, max);
            assert!(express.min <= express.max, "{}-{}", min, max);
            assert!(express.width() <= standard.width(), "{}-{}", min, max);
            assert!(express.max <= standard.max, "{}-{}", min, max);
        }
    }
}

#[test]
fn test_express_transit_shortens_by_one_day() {
    let express = RateCalculator::transit_estimate(&destination(3, 5), ServiceType::Express);
    assert_eq!((express.min, express.max), (2, 4));

    let floored = RateCalculator::transit_estimate(&destination(1, 3), ServiceType::Express);
    assert_eq!((floored.min, floored.max), (1, 2));
}

#[test]
fn test_negative_declared_value_rejected() {
    let calc = RateCalculator::default();
    let mut req = request(5.0, ServiceType::Standard);
    req.declared_value = Some(-50.0);

    let err = calc.calculate(&req, &destination(3, 5)).unwrap_err();
    assert!(
        matches!(err, CargoError::ValidationError { ref message } if message == "invalid declared value"),
        "got {:?}",
        err
    );
}

#[test]
fn test_oversized_dimensions_never_serialize_as_null() {
    let calc = RateCalculator::default();
    let mut req = request(5.0, ServiceType::Express);
    req.dimensions = Some(Dimensions::new(1e120, 1e120, 1e120));

    let err = calc.calculate(&req, &destination(3, 5)).unwrap_err();
    assert!(matches!(err, CargoError::ValidationError { .. }));
}
