//! # dst-engine
//!
//! Finds the exact local instants at which a timezone's UTC offset changes for
//! daylight-saving time, and exports the resulting schedule as tab-separated
//! validity ranges.
//!
//! Zones are described by abstract adjustment rules (fixed dates or "Nth
//! weekday of month" rules valid for a span of years). The bundled
//! [`TzdbProvider`] reconstructs those rules from the IANA database shipped
//! with `chrono-tz`.
//!
//! ## Modules
//!
//! - [`rule`] — adjustment rules and their resolution to local dates
//! - [`finder`] — transition discovery and per-year pairing
//! - [`range`] — year pairs → contiguous validity ranges
//! - [`export`] — tab-separated row formatting
//! - [`provider`] — timezone data providers
//! - [`catalog`] — per-zone pipeline and output categories
//! - [`zones`] — default and user-supplied zone lists
//! - [`error`] — Error types

pub mod catalog;
pub mod error;
pub mod export;
pub mod finder;
pub mod provider;
pub mod range;
pub mod rule;
pub mod zones;

pub use catalog::{classify, Catalog, CatalogSummary, Category};
pub use error::DstError;
pub use finder::{find_transitions, OffsetResolver, TransitionInstant, YearTransitionPair};
pub use provider::{TzdbProvider, ZoneProvider, ZoneRules};
pub use range::{to_ranges, ValidityRange, ZoneTable};
pub use rule::{resolve_transition_date, AdjustmentRule, TransitionRule};
