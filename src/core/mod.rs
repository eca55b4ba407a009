pub mod booking;
pub mod catalog;
pub mod quote;
pub mod rate_card;
pub mod rates;

pub use crate::domain::model::{CalculatedRate, Destination, QuoteRequest};
pub use crate::domain::ports::{BookingService, ConfigProvider, DestinationRepository, QuoteStore};
pub use crate::utils::error::Result;
