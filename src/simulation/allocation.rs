//! SpendAllocation — a proposed spend per channel.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel → proposed spend. Channels that are not present spend 0.
///
/// Channel names are trimmed on insert so they match cleaned observations;
/// this holds for deserialized maps too. Values are stored as given;
/// validation happens when the allocation is simulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct SpendAllocation {
    spend: BTreeMap<String, f64>,
}

impl SpendAllocation {
    pub fn new() -> Self {
        SpendAllocation::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, channel: impl AsRef<str>, spend: f64) -> Self {
        self.insert(channel, spend);
        self
    }

    /// Set the spend for `channel`, replacing any previous value.
    pub fn insert(&mut self, channel: impl AsRef<str>, spend: f64) {
        self.spend.insert(channel.as_ref().trim().to_string(), spend);
    }

    /// Spend for `channel`, 0 if absent.
    pub fn get(&self, channel: &str) -> f64 {
        self.spend.get(channel).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.spend.iter().map(|(channel, &spend)| (channel.as_str(), spend))
    }

    pub fn len(&self) -> usize {
        self.spend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spend.is_empty()
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.spend.values().sum()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for SpendAllocation {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut alloc = SpendAllocation::new();
        for (channel, spend) in iter {
            alloc.insert(channel, spend);
        }
        alloc
    }
}

impl From<BTreeMap<String, f64>> for SpendAllocation {
    fn from(spend: BTreeMap<String, f64>) -> Self {
        spend.into_iter().collect()
    }
}

impl From<SpendAllocation> for BTreeMap<String, f64> {
    fn from(alloc: SpendAllocation) -> Self {
        alloc.spend
    }
}
