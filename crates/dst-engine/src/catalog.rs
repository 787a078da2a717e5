//! Per-zone pipeline and categorization into the six export files.
//!
//! Each zone is loaded, searched for transitions and placed in exactly one
//! [`Category`]. A failure on one zone is logged and recorded against that
//! zone only; it never stops the rest of the run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DstError, Result};
use crate::export::{write_ranges, write_zone_list};
use crate::finder::{find_transitions, YearTransitionPair};
use crate::provider::ZoneProvider;
use crate::range::{to_ranges, ValidityRange, ZoneTable};

/// Output category of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Two distinct transitions in every year that has any.
    TwoTransitions,
    /// Exactly one transition in every year that has any.
    OneTransition,
    /// A mix of one- and two-transition years.
    MixedTransitions,
    /// Observes DST but no transition was found in the window.
    DstWithoutTransitions,
    /// Never observes DST.
    WithoutDst,
    /// Unknown id, or a zone whose rules could not be evaluated.
    NotFound,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::TwoTransitions,
        Category::OneTransition,
        Category::MixedTransitions,
        Category::DstWithoutTransitions,
        Category::WithoutDst,
        Category::NotFound,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Category::TwoTransitions => "two_transitions.tsv",
            Category::OneTransition => "one_transition.tsv",
            Category::MixedTransitions => "mixed_transitions.tsv",
            Category::DstWithoutTransitions => "dst_without_transitions.tsv",
            Category::WithoutDst => "without_dst.tsv",
            Category::NotFound => "not_found.tsv",
        }
    }

    /// Whether the category's file holds range rows rather than bare zone ids.
    pub fn has_ranges(self) -> bool {
        matches!(
            self,
            Category::TwoTransitions | Category::OneTransition | Category::MixedTransitions
        )
    }
}

/// Categorize a zone from its yearly transition pairs.
pub fn classify(pairs: &[YearTransitionPair]) -> Category {
    if pairs.is_empty() {
        return Category::DstWithoutTransitions;
    }
    let single = pairs.iter().filter(|p| p.is_degenerate()).count();
    if single == 0 {
        Category::TwoTransitions
    } else if single == pairs.len() {
        Category::OneTransition
    } else {
        Category::MixedTransitions
    }
}

/// Zone count of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub file: String,
    pub zones: usize,
}

/// Serializable overview of a catalog run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub start_year: i32,
    pub end_year: i32,
    pub total: usize,
    pub categories: Vec<CategoryCount>,
}

/// Categorized transition data for a set of zones.
#[derive(Debug, Clone)]
pub struct Catalog {
    start_year: i32,
    end_year: i32,
    categories: ZoneTable<Category>,
    transitions: ZoneTable<Vec<YearTransitionPair>>,
}

impl Catalog {
    /// Run every zone in `zone_ids` through the provider and the finder.
    ///
    /// Duplicate ids are processed once, at their first position.
    ///
    /// # Errors
    /// Returns `DstError::InvalidYearRange` if `start_year > end_year`. Per-zone
    /// failures are not errors; they land in [`Category::NotFound`].
    pub fn build<P, S>(zone_ids: &[S], start_year: i32, end_year: i32, provider: &P) -> Result<Self>
    where
        P: ZoneProvider + ?Sized,
        S: AsRef<str>,
    {
        if start_year > end_year {
            return Err(DstError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }

        let mut categories = ZoneTable::new();
        let mut transitions = ZoneTable::new();

        for zone_id in zone_ids {
            let zone_id = zone_id.as_ref();
            if categories.contains(zone_id) {
                debug!(zone = zone_id, "skipping duplicate zone id");
                continue;
            }

            let category = match provider.load(zone_id, start_year, end_year) {
                Err(err) => {
                    warn!(zone = zone_id, error = %err, "zone could not be loaded");
                    Category::NotFound
                }
                Ok(zone) if !zone.supports_dst => Category::WithoutDst,
                Ok(zone) => {
                    match find_transitions(start_year, end_year, &zone.rules, &*zone.resolver) {
                        Ok(pairs) => {
                            let category = classify(&pairs);
                            if !pairs.is_empty() {
                                transitions.insert(zone_id, pairs);
                            }
                            category
                        }
                        Err(err) => {
                            warn!(zone = zone_id, error = %err, "transition search failed");
                            Category::NotFound
                        }
                    }
                }
            };

            debug!(zone = zone_id, ?category, "zone categorized");
            categories.insert(zone_id, category);
        }

        info!(
            zones = categories.len(),
            with_transitions = transitions.len(),
            start_year,
            end_year,
            "catalog built"
        );

        Ok(Catalog {
            start_year,
            end_year,
            categories,
            transitions,
        })
    }

    pub fn category_of(&self, zone: &str) -> Option<Category> {
        self.categories.get(zone).copied()
    }

    /// Yearly transition pairs of a zone, if it has any.
    pub fn transitions(&self, zone: &str) -> Option<&[YearTransitionPair]> {
        self.transitions.get(zone).map(Vec::as_slice)
    }

    /// Zone ids in `category`, in input order.
    pub fn zones(&self, category: Category) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(zone, _)| zone)
            .collect()
    }

    /// Validity ranges of every zone in `category`.
    pub fn ranges(&self, category: Category) -> ZoneTable<Vec<ValidityRange>> {
        let selected: ZoneTable<Vec<YearTransitionPair>> = self
            .transitions
            .iter()
            .filter(|(zone, _)| self.category_of(zone) == Some(category))
            .map(|(zone, pairs)| (zone.to_string(), pairs.clone()))
            .collect();
        to_ranges(&selected)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            start_year: self.start_year,
            end_year: self.end_year,
            total: self.categories.len(),
            categories: Category::ALL
                .iter()
                .map(|&category| CategoryCount {
                    category,
                    file: category.file_name().to_string(),
                    zones: self.zones(category).len(),
                })
                .collect(),
        }
    }

    /// Write one file per category into `dir`, returning the paths written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let path = dir.join(category.file_name());
            let mut writer = BufWriter::new(File::create(&path)?);
            if category.has_ranges() {
                let rows = write_ranges(&mut writer, &self.ranges(category))?;
                debug!(file = %path.display(), rows, "wrote range file");
            } else {
                write_zone_list(&mut writer, &self.zones(category))?;
            }
            writer.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}
