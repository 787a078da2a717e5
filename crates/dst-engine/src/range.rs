//! Reshape per-year transition pairs into contiguous validity ranges.
//!
//! Each range is one stretch of time during which a single offset regime holds,
//! bounded by the transition that opened it and the one that closed it.

use crate::error::{DstError, Result};
use crate::finder::{TransitionInstant, YearTransitionPair};

/// A period bounded by up to two transitions. At least one bound is always
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityRange {
    /// Valid from the beginning of the analysed window until a transition.
    Opening { until: TransitionInstant },
    /// Valid between two transitions.
    Bounded {
        from: TransitionInstant,
        until: TransitionInstant,
    },
    /// Valid from a transition to the end of the analysed window.
    OpenEnded { from: TransitionInstant },
}

impl ValidityRange {
    /// Build a range from two optional bounds.
    ///
    /// # Errors
    /// Returns `DstError::EmptyRange` when both bounds are absent.
    pub fn from_parts(
        from: Option<TransitionInstant>,
        until: Option<TransitionInstant>,
    ) -> Result<Self> {
        match (from, until) {
            (Some(from), Some(until)) => Ok(ValidityRange::Bounded { from, until }),
            (Some(from), None) => Ok(ValidityRange::OpenEnded { from }),
            (None, Some(until)) => Ok(ValidityRange::Opening { until }),
            (None, None) => Err(DstError::EmptyRange),
        }
    }

    pub fn from(&self) -> Option<&TransitionInstant> {
        match self {
            ValidityRange::Bounded { from, .. } | ValidityRange::OpenEnded { from } => Some(from),
            ValidityRange::Opening { .. } => None,
        }
    }

    pub fn until(&self) -> Option<&TransitionInstant> {
        match self {
            ValidityRange::Bounded { until, .. } | ValidityRange::Opening { until } => Some(until),
            ValidityRange::OpenEnded { .. } => None,
        }
    }

    /// True for a bounded range that opens and closes on the same instant.
    pub fn is_zero_width(&self) -> bool {
        matches!(self, ValidityRange::Bounded { from, until } if from.local == until.local)
    }
}

/// Zone-keyed table that keeps insertion order and unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for ZoneTable<T> {
    fn default() -> Self {
        ZoneTable {
            entries: Vec::new(),
        }
    }
}

impl<T> ZoneTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key keeps its position and gets the new value.
    pub fn insert(&mut self, zone: impl Into<String>, value: T) {
        let zone = zone.into();
        match self.entries.iter_mut().find(|(k, _)| *k == zone) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((zone, value)),
        }
    }

    pub fn get(&self, zone: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == zone).map(|(_, v)| v)
    }

    pub fn contains(&self, zone: &str) -> bool {
        self.get(zone).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<T> FromIterator<(String, T)> for ZoneTable<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut table = ZoneTable::new();
        for (zone, value) in iter {
            table.insert(zone, value);
        }
        table
    }
}

/// Convert every zone's year pairs into validity ranges. Zones with no pairs
/// keep an empty list.
pub fn to_ranges(per_zone: &ZoneTable<Vec<YearTransitionPair>>) -> ZoneTable<Vec<ValidityRange>> {
    per_zone
        .iter()
        .map(|(zone, pairs)| (zone.to_string(), zone_ranges(pairs)))
        .collect()
}

/// Ranges for a single zone.
///
/// Every pair yields its own `(start, end)` range, and from the second pair on
/// a bridging range runs from the previous pair's end to this pair's start.
pub fn zone_ranges(pairs: &[YearTransitionPair]) -> Vec<ValidityRange> {
    let mut ranges = Vec::with_capacity(pairs.len() * 2);
    let mut previous_end: Option<TransitionInstant> = None;

    for pair in pairs {
        if let Some(prev) = previous_end {
            ranges.push(ValidityRange::Bounded {
                from: prev,
                until: pair.start,
            });
        }
        ranges.push(match pair.end {
            Some(end) => ValidityRange::Bounded {
                from: pair.start,
                until: end,
            },
            None => ValidityRange::OpenEnded { from: pair.start },
        });
        previous_end = pair.end;
    }

    ranges
}
