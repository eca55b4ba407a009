use caribe_cargo::app::handlers;
use caribe_cargo::core::quote::QuoteService;
use caribe_cargo::domain::envelope::Envelope;
use caribe_cargo::domain::model::CalculatedRate;
use caribe_cargo::utils::{logger, validation::Validate};
use caribe_cargo::LambdaConfig;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn function_handler(
    service: &QuoteService,
    event: LambdaEvent<serde_json::Value>,
) -> Result<Envelope<CalculatedRate>, Error> {
    tracing::info!(request_id = %event.context.request_id, "Calculating shipping rate");
    Ok(handlers::handle_calculate_rate(service, event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 冷啟動時建立配置與服務，之後每次呼叫共用
    let config = LambdaConfig::from_env()?;
    config.validate()?;
    let service = handlers::quote_service(&config, config.pricing.clone())?;

    run(service_fn(|event| function_handler(&service, event))).await
}
