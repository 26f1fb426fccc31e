//! # Dashboard Statistics
//!
//! Aggregates a set of leads into the summary shown on the dashboard.
//!
//! ```text
//! leads ──► total_leads      count of records
//!       ──► total_value      Σ value
//!       ──► leads_by_status  count per status (all four keys always present)
//!       ──► conversion_rate  100 × Σ value(Converted) / Σ value, 2 decimals
//!                            0 when Σ value is 0
//! ```
//!
//! The rate is held in basis points (`2963` = 29.63%) so it is exact and
//! comparable; it crosses the wire as a plain percentage number.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Lead, LeadStatus};

// =============================================================================
// Conversion Rate
// =============================================================================

/// Share of pipeline value that converted, in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConversionRate(u32);

impl ConversionRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        ConversionRate(bps)
    }

    /// Rounds a percentage such as `29.6296` to the nearest basis point.
    pub fn from_percentage(pct: f64) -> Self {
        ConversionRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// `converted / total`, or zero when `total` is zero.
    pub fn of(converted: Money, total: Money) -> Self {
        ConversionRate(converted.share_bps(total).unwrap_or(0))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a percentage with two decimals (`29.63`).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Serialize for ConversionRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.percentage())
    }
}

impl<'de> Deserialize<'de> for ConversionRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(ConversionRate::from_percentage)
    }
}

// =============================================================================
// Status Counts
// =============================================================================

/// Lead count per status. Serialized with the status names as keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCounts {
    #[serde(default)]
    pub new: u32,
    #[serde(default)]
    pub contacted: u32,
    #[serde(default)]
    pub converted: u32,
    #[serde(default)]
    pub lost: u32,
}

impl StatusCounts {
    pub fn get(&self, status: LeadStatus) -> u32 {
        match status {
            LeadStatus::New => self.new,
            LeadStatus::Contacted => self.contacted,
            LeadStatus::Converted => self.converted,
            LeadStatus::Lost => self.lost,
        }
    }

    fn increment(&mut self, status: LeadStatus) {
        let slot = match status {
            LeadStatus::New => &mut self.new,
            LeadStatus::Contacted => &mut self.contacted,
            LeadStatus::Converted => &mut self.converted,
            LeadStatus::Lost => &mut self.lost,
        };
        *slot += 1;
    }
}

// =============================================================================
// Dashboard Stats
// =============================================================================

/// Summary of the lead pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: u32,
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub total_value: Money,
    pub leads_by_status: StatusCounts,
    #[ts(type = "number")]
    pub conversion_rate: ConversionRate,
}

impl DashboardStats {
    /// Aggregates `leads` in one pass.
    pub fn aggregate<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> Self {
        let mut stats = DashboardStats::default();
        let mut converted_value = Money::zero();

        for lead in leads {
            stats.total_leads += 1;
            stats.total_value += lead.value;
            stats.leads_by_status.increment(lead.status);
            if lead.status == LeadStatus::Converted {
                converted_value += lead.value;
            }
        }

        stats.conversion_rate = ConversionRate::of(converted_value, stats.total_value);
        stats
    }
}
