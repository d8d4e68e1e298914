//! Start/end records for create and delete phases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::duration::{self, format_duration};

/// A pair of UTC instants with the elapsed time between them.
///
/// The provisioner fills these in; the validator never does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeFrame {
    /// When the phase started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_utc: Option<DateTime<Utc>>,
    /// When the phase ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_utc: Option<DateTime<Utc>>,
    /// Elapsed time, derived from the two instants.
    #[serde(with = "duration::nanos")]
    pub took: Duration,
    /// Elapsed time as text.
    pub took_string: String,
}

impl TimeFrame {
    /// Builds a time frame from two instants. An end before the start yields
    /// a zero duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration as ChronoDuration, Utc};
    /// use eksconfig::config::TimeFrame;
    ///
    /// let start = Utc::now();
    /// let tf = TimeFrame::new(start, start + ChronoDuration::seconds(90));
    /// assert_eq!(tf.took_string, "1m30s");
    /// ```
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let took = (end - start).to_std().unwrap_or(Duration::ZERO);
        Self {
            start_utc: Some(start),
            end_utc: Some(end),
            took,
            took_string: format_duration(took),
        }
    }

    /// Elapsed time, recomputed from the instants when both are present.
    #[must_use]
    pub fn took(&self) -> Duration {
        match (self.start_utc, self.end_utc) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => self.took,
        }
    }

    /// Whether neither instant has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_utc.is_none() && self.end_utc.is_none()
    }
}
