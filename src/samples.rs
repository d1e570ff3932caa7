use crate::error::{NeurioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregation resolution for sample and statistics queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl Granularity {
    /// The value the API expects in the `granularity` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Seconds => "seconds",
            Granularity::Minutes => "minutes",
            Granularity::Hours => "hours",
            Granularity::Days => "days",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for the `/samples`, `/samples/full` and `/samples/stats`
/// endpoints.
///
/// `start` and `granularity` are required by the API; `end` and `frequency`
/// are appended to the request only when set. Timestamps are ISO-8601 strings
/// (`yyyy-mm-ddThh:mm:ssZ`) and are passed through unvalidated, the same way
/// the API itself treats them.
#[derive(Clone, Debug, Default)]
pub struct SamplesQuery {
    pub start: Option<String>,
    pub granularity: Option<Granularity>,
    pub end: Option<String>,
    pub frequency: Option<u32>,
}

impl SamplesQuery {
    pub fn new(start: impl Into<String>, granularity: Granularity) -> Self {
        SamplesQuery {
            start: Some(start.into()),
            granularity: Some(granularity),
            end: None,
            frequency: None,
        }
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Checks the required parameters, so a request is only built once both
    /// are known to be present.
    pub(crate) fn require(&self) -> Result<(&str, Granularity)> {
        let start = self
            .start
            .as_deref()
            .ok_or(NeurioError::MissingParameters("start"))?;
        let granularity = self
            .granularity
            .ok_or(NeurioError::MissingParameters("granularity"))?;
        Ok((start, granularity))
    }
}
