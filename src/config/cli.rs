use crate::domain::model::{BookingType, Dimensions, QuoteRequest, ServiceType, WindowQuery};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "caribe-cargo")]
#[command(about = "Air-cargo rate quotes and pickup bookings for Caribbean destinations")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Read destinations from this CSV file instead of the datastore
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List active destinations
    Destinations,
    /// Calculate a shipping rate
    Quote(QuoteArgs),
    /// Show the tier table and worked examples for a destination
    RateCard {
        #[arg(long)]
        destination: String,
    },
    /// List pickup or drop-off windows for a date
    Windows(WindowArgs),
    /// Book one of the listed windows
    Book(BookArgs),
}

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// Actual weight in pounds
    #[arg(long)]
    pub weight: f64,

    #[arg(long)]
    pub destination: String,

    #[arg(long)]
    pub length: Option<f64>,

    #[arg(long)]
    pub width: Option<f64>,

    #[arg(long)]
    pub height: Option<f64>,

    #[arg(long)]
    pub express: bool,

    #[arg(long)]
    pub declared_value: Option<f64>,

    #[arg(long)]
    pub special_handling: bool,

    /// Store the quote in the datastore
    #[arg(long)]
    pub save: bool,

    #[arg(long, requires = "save")]
    pub customer_id: Option<String>,
}

impl QuoteArgs {
    pub fn to_request(&self) -> QuoteRequest {
        let dimensions = if self.length.is_some() || self.width.is_some() || self.height.is_some() {
            Some(Dimensions {
                length: self.length,
                width: self.width,
                height: self.height,
            })
        } else {
            None
        };

        QuoteRequest {
            weight: self.weight,
            dimensions,
            destination_id: self.destination.clone(),
            service_type: service_type(self.express),
            declared_value: self.declared_value,
            special_handling: self.special_handling,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,

    /// Estimated weight in pounds
    #[arg(long)]
    pub weight: f64,

    /// Drop off at the warehouse instead of a pickup
    #[arg(long)]
    pub drop_off: bool,

    #[arg(long)]
    pub express: bool,

    #[arg(long)]
    pub zip: Option<String>,
}

impl WindowArgs {
    pub fn to_query(&self) -> WindowQuery {
        WindowQuery {
            date: self.date,
            estimated_weight_lbs: self.weight,
            booking_type: if self.drop_off {
                BookingType::DropOff
            } else {
                BookingType::Pickup
            },
            service_type: service_type(self.express),
            zip_code: self.zip.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// 1-based position in the `windows` listing
    #[arg(long)]
    pub slot: usize,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub notes: Option<String>,
}

fn service_type(express: bool) -> ServiceType {
    if express {
        ServiceType::Express
    } else {
        ServiceType::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_command() {
        let cli = CliConfig::parse_from([
            "caribe-cargo",
            "quote",
            "--weight",
            "12",
            "--destination",
            "dest-kin",
            "--length",
            "20",
            "--express",
        ]);
        let Command::Quote(args) = cli.command else {
            panic!("expected quote command");
        };
        let request = args.to_request();
        assert_eq!(request.service_type, ServiceType::Express);
        assert_eq!(request.dimensions.unwrap().length, Some(20.0));
        assert_eq!(request.dimensions.unwrap().width, None);
    }

    #[test]
    fn test_parse_book_command() {
        let cli = CliConfig::parse_from([
            "caribe-cargo",
            "--catalog",
            "destinations.csv",
            "book",
            "--date",
            "2026-11-02",
            "--weight",
            "40",
            "--slot",
            "2",
            "--address",
            "1200 NW 72nd Ave, Miami",
        ]);
        assert_eq!(cli.catalog.as_deref(), Some("destinations.csv"));
        let Command::Book(args) = cli.command else {
            panic!("expected book command");
        };
        assert_eq!(args.slot, 2);
        assert_eq!(args.window.to_query().booking_type, BookingType::Pickup);
    }
}
