use anyhow::Result;
use caribe_cargo::core::{DestinationRepository, QuoteStore};
use caribe_cargo::domain::model::{QuoteRecord, ServiceType};
use caribe_cargo::{CargoError, SupabaseClient};
use httpmock::prelude::*;
use std::time::Duration;

fn client(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(&server.base_url(), "anon-key", Duration::from_secs(5)).unwrap()
}

fn destination_rows() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "b1f0", "country_name": "Barbados", "city_name": "Bridgetown",
            "airport_code": "BGI", "rate_per_lb_1_50": 5.0, "rate_per_lb_51_100": 4.5,
            "rate_per_lb_101_200": 4.0, "rate_per_lb_201_plus": 3.5,
            "express_surcharge_percent": 25, "transit_days_min": 3, "transit_days_max": 5,
            "is_active": true
        },
        {
            "id": "a9c2", "country_name": "Anguilla", "city_name": "The Valley",
            "airport_code": "AXA", "rate_per_lb_1_50": "cheap", "rate_per_lb_51_100": 4.5,
            "rate_per_lb_101_200": 4.0, "rate_per_lb_201_plus": 3.5,
            "express_surcharge_percent": 25, "transit_days_min": 3, "transit_days_max": 5,
            "is_active": true
        },
        {
            "id": 17, "country_name": "Antigua and Barbuda", "city_name": "St. John's",
            "airport_code": "anu", "rate_per_lb_1_50": 5.5, "rate_per_lb_51_100": 5.0,
            "rate_per_lb_101_200": 4.5, "rate_per_lb_201_plus": 4.0,
            "express_surcharge_percent": null, "transit_days_min": 4, "transit_days_max": 6,
            "is_active": true
        }
    ])
}

#[tokio::test]
async fn test_lists_active_destinations_with_auth_headers() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/destinations")
            .query_param("is_active", "eq.true")
            .query_param("order", "country_name.asc,city_name.asc")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer anon-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(destination_rows());
    });

    let destinations = client(&server).list_active_destinations().await?;
    mock.assert();

    // Anguilla row has a non-numeric rate and is dropped
    let ids: Vec<_> = destinations.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["17", "b1f0"]);
    assert_eq!(destinations[0].airport_code, "ANU");
    assert_eq!(destinations[0].express_surcharge_percent, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_find_destination_filters_by_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/destinations")
            .query_param("id", "eq.missing")
            .query_param("is_active", "eq.true");
        then.status(200).json_body(serde_json::json!([]));
    });

    let found = client(&server)
        .find_active_destination("missing")
        .await
        .unwrap();
    mock.assert();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_user_token_replaces_anon_bearer() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/destinations")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer user-jwt");
        then.status(200).json_body(serde_json::json!([]));
    });

    let destinations = client(&server)
        .with_access_token("user-jwt")
        .list_active_destinations()
        .await
        .unwrap();
    mock.assert();
    assert!(destinations.is_empty());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/destinations");
        then.status(503)
            .json_body(serde_json::json!({"message": "upstream unavailable"}));
    });

    let err = client(&server).list_active_destinations().await.unwrap_err();
    mock.assert();
    assert!(err.is_retryable());
    match err {
        CargoError::UpstreamError { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_save_quote_returns_representation() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/quotes")
            .header("prefer", "return=representation")
            .body_contains("\"destination_id\":\"b1f0\"");
        then.status(201).json_body(serde_json::json!([{
            "id": "q-001",
            "customer_id": "cust-9",
            "destination_id": "b1f0",
            "weight": 12.0,
            "billable_weight": 12.0,
            "service_type": "express",
            "declared_value": null,
            "total_cost": 75.0,
            "transit_time": "2-4 business days",
            "created_at": "2026-10-15T14:03:00Z"
        }]));
    });

    let record = QuoteRecord {
        id: None,
        customer_id: Some("cust-9".to_string()),
        destination_id: "b1f0".to_string(),
        weight: 12.0,
        billable_weight: 12.0,
        service_type: ServiceType::Express,
        declared_value: None,
        total_cost: 75.0,
        transit_time: "2-4 business days".to_string(),
        created_at: None,
    };

    let saved = client(&server).save_quote(&record).await?;
    mock.assert();
    assert_eq!(saved.id.as_deref(), Some("q-001"));
    assert!(saved.created_at.is_some());
    Ok(())
}
