//! # Duplicate Sale Detector
//!
//! Finds sales that are very likely the same real-world transaction recorded
//! more than once, while leaving legitimate repeat purchases alone.
//!
//! ## How a Pair Is Judged
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  anchor S (earliest unprocessed)        candidate C (later, unprocessed)│
//! │                                                                         │
//! │  C.date - S.date > 5 min ?  ──yes──► stop scanning for S                │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │  same customer (trim + lowercase) ? ──no──► skip C                      │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │  same items (product id + qty) ?    ──no──► skip C                      │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │  score = 10                                                             │
//! │        + 5  same total (< R$ 0,01 apart)                                │
//! │        + 3  same CPF                                                    │
//! │        + 2  same cash-register session                                  │
//! │        + 3  less than 1 minute apart                                    │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  score >= 15 ?  ──yes──► C joins S's group, C is processed              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scan is O(n·w) where w is the number of sales inside the window:
//! candidates are contiguous after sorting, so the inner loop breaks as soon
//! as the window is exceeded.
//!
//! ## Usage
//! ```rust
//! use saleguard_core::duplicates::{detect_duplicates, Confidence};
//! # use saleguard_core::{Sale, SaleItem, PaymentMethod};
//! # use chrono::{TimeZone, Utc};
//! # fn sale(id: &str, secs: i64) -> Sale {
//! #     Sale {
//! #         id: id.into(),
//! #         tenant_id: "t".into(),
//! #         date: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
//! #         customer_name: "Maria Silva".into(),
//! #         customer_cpf: None,
//! #         total_cents: 2000,
//! #         payment_method: PaymentMethod::Cash,
//! #         session_id: None,
//! #         items: vec![SaleItem {
//! #             product_id: "p1".into(),
//! #             name_snapshot: String::new(),
//! #             unit_price_cents: 1000,
//! #             quantity: 2,
//! #         }],
//! #     }
//! # }
//!
//! let sales = vec![sale("a", 0), sale("b", 30)];
//! let result = detect_duplicates(&sales);
//!
//! assert_eq!(result.duplicate_groups.len(), 1);
//! assert_eq!(result.duplicate_groups[0].confidence, Confidence::High);
//! assert_eq!(result.estimated_loss.cents(), 2000);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Sale;

// =============================================================================
// Scoring Constants
// =============================================================================

/// Sales further apart than this are never compared.
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Repeats closer than this get the close-time bonus.
pub const DEFAULT_CLOSE_TIME_MS: i64 = 60_000;

/// Totals closer than this (strictly) count as the same total.
pub const DEFAULT_TOTAL_TOLERANCE_CENTS: i64 = 1;

/// Score for passing both mandatory gates (customer and items).
pub const BASE_SCORE: u32 = 10;

/// Bonus when totals match.
pub const SAME_TOTAL_SCORE: u32 = 5;

/// Bonus when both sales carry the same CPF.
pub const SAME_CPF_SCORE: u32 = 3;

/// Bonus when both sales belong to the same cash-register session.
pub const SAME_SESSION_SCORE: u32 = 2;

/// Bonus for near-instant repeats.
pub const CLOSE_TIME_SCORE: u32 = 3;

/// Minimum score for a candidate to be accepted as a duplicate.
pub const DEFAULT_MIN_SCORE: u32 = 15;

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for a detection run. `Default` reproduces the standard heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionConfig {
    /// Hard cutoff between anchor and candidate.
    pub window: Duration,
    /// Gap under which the close-time bonus applies.
    pub close_time: Duration,
    /// Totals differing by less than this are the same total.
    pub total_tolerance: Money,
    /// Acceptance threshold.
    pub min_score: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            window: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            close_time: Duration::milliseconds(DEFAULT_CLOSE_TIME_MS),
            total_tolerance: Money::from_cents(DEFAULT_TOTAL_TOLERANCE_CENTS),
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl DetectionConfig {
    /// Sets the comparison window.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the close-time threshold.
    pub fn close_time(mut self, close_time: Duration) -> Self {
        self.close_time = close_time;
        self
    }

    /// Sets the acceptance threshold.
    pub fn min_score(mut self, min_score: u32) -> Self {
        self.min_score = min_score;
        self
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Which match signals fired for a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriteria {
    pub same_customer: bool,
    pub same_total: bool,
    pub same_items: bool,
    pub close_time: bool,
}

impl MatchCriteria {
    /// Number of criteria that are true (0-4).
    pub fn matched_count(&self) -> usize {
        [
            self.same_customer,
            self.same_total,
            self.same_items,
            self.close_time,
        ]
        .iter()
        .filter(|&&hit| hit)
        .count()
    }
}

/// How sure the detector is that a group is a real duplicate.
///
/// Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence level: {other}")),
        }
    }
}

/// A sale plus the later sales judged to be repeats of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    /// The earliest sale in the group, the one to keep.
    pub original_sale: Sale,
    /// Repeats of `original_sale`, in chronological order.
    pub duplicates: Vec<Sale>,
    /// Signals of the last accepted duplicate.
    pub criteria: MatchCriteria,
    pub confidence: Confidence,
}

impl DuplicateGroup {
    /// Sum of the duplicated totals.
    pub fn duplicated_amount(&self) -> Money {
        self.duplicates.iter().map(Sale::total).sum()
    }
}

/// Outcome of one detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateDetectionResult {
    /// Number of input sales.
    pub total_sales: usize,
    pub duplicate_groups: Vec<DuplicateGroup>,
    /// Σ `duplicates.len()` over all groups.
    pub total_duplicates: usize,
    /// Σ duplicate totals: revenue inflated by the duplicate entries.
    pub estimated_loss: Money,
}

/// Which groups an operator chose for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    /// Every group.
    All,
    /// Zero-based group indices. Out-of-range indices are ignored.
    Indices(Vec<usize>),
    /// Groups at or above the given confidence.
    MinConfidence(Confidence),
}

impl DuplicateDetectionResult {
    /// True when no duplicate groups were found.
    pub fn is_empty(&self) -> bool {
        self.duplicate_groups.is_empty()
    }

    /// Ids of every duplicate in group order. Originals are never included.
    pub fn duplicate_ids(&self) -> Vec<String> {
        self.select(&GroupSelection::All)
    }

    /// Ids of the duplicates in the selected groups, in group order.
    pub fn select(&self, selection: &GroupSelection) -> Vec<String> {
        self.duplicate_groups
            .iter()
            .enumerate()
            .filter(|(index, group)| match selection {
                GroupSelection::All => true,
                GroupSelection::Indices(indices) => indices.contains(index),
                GroupSelection::MinConfidence(min) => group.confidence >= *min,
            })
            .flat_map(|(_, group)| group.duplicates.iter().map(|sale| sale.id.clone()))
            .collect()
    }
}

// =============================================================================
// Pair Scoring
// =============================================================================

/// Signals and score for a candidate that passed both mandatory gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairScore {
    pub same_total: bool,
    pub same_cpf: bool,
    pub same_session: bool,
    pub close_time: bool,
    pub score: u32,
}

impl PairScore {
    fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            same_customer: true,
            same_total: self.same_total,
            same_items: true,
            close_time: self.close_time,
        }
    }
}

// =============================================================================
// Detector
// =============================================================================

/// The duplicate sale detector.
///
/// Stateless apart from its configuration; every call to
/// [`DuplicateDetector::detect`] uses its own `processed` set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDetector {
    config: DetectionConfig,
}

impl DuplicateDetector {
    pub fn new(config: DetectionConfig) -> Self {
        DuplicateDetector { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Groups the sales that look like accidental duplicates of each other.
    ///
    /// The input is never reordered; a sorted view is built internally.
    pub fn detect(&self, sales: &[Sale]) -> DuplicateDetectionResult {
        let mut sorted: Vec<&Sale> = sales.iter().collect();
        // Stable: equal timestamps keep input order
        sorted.sort_by_key(|sale| sale.date);

        let mut processed: HashSet<&str> = HashSet::new();
        let mut duplicate_groups = Vec::new();

        for (i, anchor) in sorted.iter().enumerate() {
            if processed.contains(anchor.id.as_str()) {
                continue;
            }

            let mut duplicates: Vec<Sale> = Vec::new();
            let mut criteria = MatchCriteria::default();

            for candidate in &sorted[i + 1..] {
                if candidate.date - anchor.date > self.config.window {
                    break;
                }
                if candidate.id == anchor.id || processed.contains(candidate.id.as_str()) {
                    continue;
                }

                let Some(pair) = self.score_pair(anchor, candidate) else {
                    continue;
                };

                if pair.score >= self.config.min_score {
                    duplicates.push((*candidate).clone());
                    processed.insert(candidate.id.as_str());
                    // Last accepted candidate wins
                    criteria = pair.criteria();
                }
            }

            if !duplicates.is_empty() {
                processed.insert(anchor.id.as_str());
                duplicate_groups.push(DuplicateGroup {
                    original_sale: (*anchor).clone(),
                    duplicates,
                    criteria,
                    confidence: calculate_confidence(&criteria),
                });
            }
        }

        let total_duplicates = duplicate_groups.iter().map(|g| g.duplicates.len()).sum();
        let estimated_loss = duplicate_groups
            .iter()
            .map(DuplicateGroup::duplicated_amount)
            .sum();

        DuplicateDetectionResult {
            total_sales: sales.len(),
            duplicate_groups,
            total_duplicates,
            estimated_loss,
        }
    }

    /// Scores `candidate` against `anchor`.
    ///
    /// Returns `None` when a mandatory gate fails (different customer or
    /// different items). The time window is not checked here.
    pub fn score_pair(&self, anchor: &Sale, candidate: &Sale) -> Option<PairScore> {
        if anchor.normalized_customer() != candidate.normalized_customer() {
            return None;
        }
        if !compare_sale_items(anchor, candidate) {
            return None;
        }

        let gap = (candidate.date - anchor.date).abs();

        let same_total = anchor.total().abs_diff(candidate.total()) < self.config.total_tolerance;
        let same_cpf = matches!(
            (anchor.cpf(), candidate.cpf()),
            (Some(a), Some(b)) if a == b
        );
        let same_session = matches!(
            (&anchor.session_id, &candidate.session_id),
            (Some(a), Some(b)) if a == b
        );
        let close_time = gap < self.config.close_time;

        let mut score = BASE_SCORE;
        if same_total {
            score += SAME_TOTAL_SCORE;
        }
        if same_cpf {
            score += SAME_CPF_SCORE;
        }
        if same_session {
            score += SAME_SESSION_SCORE;
        }
        if close_time {
            score += CLOSE_TIME_SCORE;
        }

        Some(PairScore {
            same_total,
            same_cpf,
            same_session,
            close_time,
            score,
        })
    }
}

/// Runs the detector with the default configuration.
pub fn detect_duplicates(sales: &[Sale]) -> DuplicateDetectionResult {
    DuplicateDetector::default().detect(sales)
}

/// True when both sales carry the same basket.
///
/// Same number of lines, and every line of `b` has a line in `a` with the
/// same product id and quantity. Unit prices are not compared.
pub fn compare_sale_items(a: &Sale, b: &Sale) -> bool {
    if a.items.len() != b.items.len() {
        return false;
    }

    let lookup: HashSet<(&str, i64)> = a
        .items
        .iter()
        .map(|item| (item.product_id.as_str(), item.quantity))
        .collect();

    b.items
        .iter()
        .all(|item| lookup.contains(&(item.product_id.as_str(), item.quantity)))
}

/// High when all four criteria hold, Medium with three, Low otherwise.
pub fn calculate_confidence(criteria: &MatchCriteria) -> Confidence {
    match criteria.matched_count() {
        4 => Confidence::High,
        3 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
