pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LambdaConfig, TomlConfig};

pub use adapters::SupabaseClient;
pub use core::{
    booking::BookingFlow, catalog::DestinationCatalog, quote::QuoteService,
    rates::RateCalculator,
};
pub use utils::error::{CargoError, Result};
