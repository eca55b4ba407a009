use caribe_cargo::adapters::SupabaseClient;
use caribe_cargo::app::handlers;
use caribe_cargo::config::cli::{BookArgs, Command, QuoteArgs, WindowArgs};
use caribe_cargo::core::booking::{BookingDraft, BookingFlow, BookingOutcome};
use caribe_cargo::core::quote::QuoteService;
use caribe_cargo::core::rate_card::{build_rate_card, EXAMPLE_WEIGHTS};
use caribe_cargo::domain::model::{Availability, CalculatedRate};
use caribe_cargo::utils::error::{CargoError, ErrorSeverity, Result};
use caribe_cargo::utils::{logger, validation::Validate};
use caribe_cargo::{CliConfig, TomlConfig};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,      // 輸入錯誤
            ErrorSeverity::Medium => 3,   // 可手動重試
            ErrorSeverity::High => 1,     // 設定錯誤
            ErrorSeverity::Critical => 4, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

fn load_config(cli: &CliConfig) -> Result<TomlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::from_env(),
    };

    if let Some(catalog) = &cli.catalog {
        config.catalog.path = Some(catalog.clone());
    }

    config.validate()?;
    Ok(config)
}

fn datastore(config: &TomlConfig) -> Result<SupabaseClient> {
    let client = SupabaseClient::from_config(config)?;
    match &config.supabase.functions_url {
        Some(url) => client.with_functions_url(url),
        None => Ok(client),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Destinations => list_destinations(&config, cli.json).await,
        Command::Quote(args) => {
            let quotes = handlers::quote_service(&config, config.pricing.clone())?;
            quote(&quotes, &config, args, cli.json).await
        }
        Command::RateCard { destination } => {
            let quotes = handlers::quote_service(&config, config.pricing.clone())?;
            rate_card(&quotes, &config, destination, cli.json).await
        }
        Command::Windows(args) => windows(&config, args, cli.json).await,
        Command::Book(args) => book(&config, args, cli.json).await,
    }
}

async fn list_destinations(config: &TomlConfig, json: bool) -> Result<()> {
    let destinations = handlers::destination_repository(config)?
        .list_active_destinations()
        .await?;

    if json {
        return print_json(&destinations);
    }

    println!("{:<16} {:<22} {:<20} {:>5}", "ID", "COUNTRY", "CITY", "CODE");
    for d in &destinations {
        println!(
            "{:<16} {:<22} {:<20} {:>5}",
            d.id, d.country_name, d.city_name, d.airport_code
        );
    }
    Ok(())
}

fn print_rate(rate: &CalculatedRate) {
    let b = &rate.rate_breakdown;
    println!("Billable weight:   {:.2} lbs", rate.billable_weight);
    if let Some(dim) = rate.dimensional_weight {
        println!("  (dimensional:    {:.2} lbs)", dim);
    }
    println!("Rate per lb:       ${:.2}", rate.rate_per_lb);
    println!("Base cost:         ${:.2}", b.base_cost);
    if b.express_surcharge > 0.0 {
        println!("Express surcharge: ${:.2}", b.express_surcharge);
    }
    if b.handling_fee > 0.0 {
        println!("Handling fee:      ${:.2}", b.handling_fee);
    }
    if b.insurance_cost > 0.0 {
        println!("Insurance:         ${:.2}", b.insurance_cost);
    }
    println!("Total:             ${:.2}", b.total_cost);
    println!("Transit time:      {} ({})", rate.transit_time, rate.service_type);
}

async fn quote(quotes: &QuoteService, config: &TomlConfig, args: &QuoteArgs, json: bool) -> Result<()> {
    let request = args.to_request();

    let rate = if args.save {
        let store = datastore(config)?;
        let (rate, saved) = quotes
            .quote_and_save(&request, &store, args.customer_id.clone())
            .await?;
        if !json {
            println!("📝 Quote saved: {}", saved.id.as_deref().unwrap_or("-"));
        }
        rate
    } else {
        quotes.quote(&request).await?
    };

    if json {
        print_json(&rate)
    } else {
        print_rate(&rate);
        Ok(())
    }
}

async fn rate_card(quotes: &QuoteService, config: &TomlConfig, destination_id: &str, json: bool) -> Result<()> {
    let destination = handlers::destination_repository(config)?
        .find_active_destination(destination_id)
        .await?
        .ok_or_else(|| CargoError::lookup("unknown destination"))?;
    let card = build_rate_card(quotes.calculator(), &destination, &EXAMPLE_WEIGHTS)?;

    if json {
        return print_json(&card);
    }

    println!("{} (express +{}%)", card.destination, card.express_surcharge_percent);
    for row in &card.tiers {
        println!("  {:<12} ${:.2}/lb", row.label, row.rate_per_lb);
    }
    println!("Examples:");
    for example in &card.examples {
        println!(
            "  {:>6.1} lbs  standard ${:>9.2}  express ${:>9.2}",
            example.weight, example.standard_total, example.express_total
        );
    }
    println!(
        "Transit: standard {}, express {}",
        card.standard_transit, card.express_transit
    );
    Ok(())
}

fn booking_flow(config: &TomlConfig) -> Result<BookingFlow> {
    Ok(BookingFlow::new(Arc::new(datastore(config)?)))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_availability(availability: &Availability) {
    match availability {
        Availability::Available { windows } if windows.is_empty() => {
            println!("No windows returned for that date.");
        }
        Availability::Available { windows } => {
            for (index, window) in windows.iter().enumerate() {
                println!(
                    "  [{}] {:<24} capacity {:>7.1} lbs  vehicle {}",
                    index + 1,
                    window.display,
                    window.remaining_capacity_lbs,
                    window.assigned_vehicle
                );
            }
        }
        Availability::Unavailable { reason, message } => {
            println!("Unavailable: {}", message.as_deref().unwrap_or(&reason.to_string()));
        }
    }
}

async fn windows(config: &TomlConfig, args: &WindowArgs, json: bool) -> Result<()> {
    let availability = booking_flow(config)?
        .available_windows(&args.to_query(), today())
        .await?;

    if json {
        print_json(&availability)
    } else {
        print_availability(&availability);
        Ok(())
    }
}

async fn book(config: &TomlConfig, args: &BookArgs, json: bool) -> Result<()> {
    let flow = booking_flow(config)?;
    let query = args.window.to_query();
    let availability = flow.available_windows(&query, today()).await?;

    let window = args
        .slot
        .checked_sub(1)
        .and_then(|index| availability.windows().get(index))
        .cloned()
        .ok_or_else(|| CargoError::validation(format!("no window number {} for that date", args.slot)))?;

    let draft = BookingDraft {
        window,
        booking_type: query.booking_type,
        address: args.address.clone(),
        weight_lbs: query.estimated_weight_lbs,
        notes: args.notes.clone(),
    };

    match flow.submit(&draft, &query).await? {
        BookingOutcome::Confirmed(booking) => {
            if json {
                return print_json(&booking);
            }
            println!("✅ Booking {} {:?} for {}", booking.id, booking.status, draft.window.display);
            Ok(())
        }
        BookingOutcome::WindowTaken {
            message,
            alternatives,
        } => {
            eprintln!("⚠️ {}", message);
            eprintln!("That window was just taken. Current availability:");
            print_availability(&alternatives);
            Err(CargoError::conflict(message))
        }
    }
}
