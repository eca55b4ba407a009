use caribe_cargo::app::handlers;
use caribe_cargo::core::booking::BookingFlow;
use caribe_cargo::domain::envelope::Envelope;
use caribe_cargo::domain::model::Availability;
use caribe_cargo::utils::{logger, validation::Validate};
use caribe_cargo::{LambdaConfig, SupabaseClient};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;

async fn function_handler(
    flow: &BookingFlow,
    event: LambdaEvent<serde_json::Value>,
) -> Result<Envelope<Availability>, Error> {
    tracing::info!(request_id = %event.context.request_id, "Listing booking windows");
    let today = chrono::Utc::now().date_naive();
    Ok(handlers::handle_available_windows(flow, event.payload, today).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;
    // 時段查詢一定要打遠端服務
    config.validate_datastore()?;

    let mut client = SupabaseClient::from_config(&config)?;
    if let Some(url) = &config.functions_url {
        client = client.with_functions_url(url)?;
    }
    let flow = BookingFlow::new(Arc::new(client));

    run(service_fn(|event| function_handler(&flow, event))).await
}
