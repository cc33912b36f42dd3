//! Domain entities - the weather aggregate and its parts

mod location_weather;
mod weather_alert;
mod weather_forecast;
mod weather_info;

pub use location_weather::LocationWeather;
pub use weather_alert::{AlertSeverity, WeatherAlert};
pub use weather_forecast::WeatherForecast;
pub use weather_info::WeatherInfo;
