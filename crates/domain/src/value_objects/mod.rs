//! Value Objects - Immutable, identity-less domain primitives

mod data_source;
mod humidity;
mod location;
mod temperature;

pub use data_source::DataSource;
pub use humidity::Humidity;
pub use location::Location;
pub use temperature::Celsius;
