//! Vendor weather integrations
//!
//! Wire schemas for OpenWeatherMap (<https://openweathermap.org/api>) and
//! WeatherAPI.com (<https://www.weatherapi.com/docs/>), plus their mapping
//! into domain types. Interval samples are folded into daily forecasts by
//! [`daily::aggregate_daily`]. No HTTP happens here; the infrastructure
//! adapters fetch and then call into these mappers.

pub mod daily;
mod error;
pub mod openweather;
pub mod weatherapi;

pub use daily::{Sample, aggregate_daily};
pub use error::MappingError;
