//! Response-time statistics.

use serde::{Deserialize, Serialize};

use crate::model::Item;
use crate::recorder::Responses;

/// Summary of response latencies over the answered items of a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub answered: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl ResponseTimeStats {
    /// Stats over the items of a form that have a response.
    pub fn from_responses<'a>(form: impl IntoIterator<Item = &'a Item>, responses: &Responses) -> Self {
        let times: Vec<u64> = form
            .into_iter()
            .filter_map(|item| responses.get(&item.id).map(|r| r.rt_ms))
            .collect();
        Self::from_times(times)
    }

    /// Stats over raw latencies in milliseconds.
    pub fn from_times(mut times: Vec<u64>) -> Self {
        if times.is_empty() {
            return Self::default();
        }
        times.sort_unstable();

        let n = times.len();
        let sum: u64 = times.iter().sum();
        let median_ms = if n % 2 == 0 {
            (times[n / 2 - 1] + times[n / 2]) as f64 / 2.0
        } else {
            times[n / 2] as f64
        };

        Self {
            answered: n,
            mean_ms: sum as f64 / n as f64,
            median_ms,
            min_ms: times[0],
            max_ms: times[n - 1],
        }
    }
}
