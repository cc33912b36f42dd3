//! Daily aggregation of interval forecasts
//!
//! Vendors report forecasts in 1-hour or 3-hour steps. A daily forecast
//! takes the mean temperature of the day's samples, their min and max, and
//! the description that occurs most often (ties go to the one seen first).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use domain::{DataSource, WeatherForecast};

use crate::error::MappingError;

/// One interval forecast sample
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub at: DateTime<Utc>,
    pub temperature_c: f64,
    pub description: String,
}

impl Sample {
    pub fn new(at: DateTime<Utc>, temperature_c: f64, description: impl Into<String>) -> Self {
        Self {
            at,
            temperature_c,
            description: description.into(),
        }
    }
}

#[derive(Debug, Default)]
struct DayBucket {
    temperatures: Vec<f64>,
    // (description, count) in first-seen order
    descriptions: Vec<(String, usize)>,
}

impl DayBucket {
    fn push(&mut self, sample: Sample) {
        self.temperatures.push(sample.temperature_c);
        match self
            .descriptions
            .iter_mut()
            .find(|(d, _)| *d == sample.description)
        {
            Some((_, count)) => *count += 1,
            None => self.descriptions.push((sample.description, 1)),
        }
    }

    fn dominant_description(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.descriptions {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(d, _)| d.as_str())
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarize(&self, date: NaiveDate) -> Result<WeatherForecast, MappingError> {
        let description = self
            .dominant_description()
            .ok_or(MappingError::MissingField("description"))?;
        let min = self.temperatures.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .temperatures
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = self.temperatures.iter().sum::<f64>() / self.temperatures.len() as f64;

        Ok(WeatherForecast::new_unchecked(date, description, mean)?.with_range(min, max)?)
    }
}

/// Fold interval samples into at most `days` daily forecasts
///
/// Samples are grouped by UTC date. Days before `today` are dropped, the
/// remaining ones are returned in date order, each tagged with `source`.
///
/// # Errors
///
/// Fails if a day's values violate domain rules (e.g. temperatures out of
/// range).
pub fn aggregate_daily(
    samples: impl IntoIterator<Item = Sample>,
    days: u8,
    today: NaiveDate,
    source: &DataSource,
) -> Result<Vec<WeatherForecast>, MappingError> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for sample in samples {
        let date = sample.at.date_naive();
        if date < today {
            continue;
        }
        buckets.entry(date).or_default().push(sample);
    }

    buckets
        .iter()
        .take(usize::from(days))
        .map(|(date, bucket)| Ok(bucket.summarize(*date)?.with_source(source.clone())))
        .collect()
}
