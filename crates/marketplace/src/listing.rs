use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use cashless_core::{DomainError, Money, ValueObject};

/// Smallest step a new bid must clear the current one by.
pub const BID_INCREMENT: Money = Money::from_dollars(25);

/// Auctions closing within this many hours are flagged as ending soon.
pub const ENDING_SOON_HOURS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ListingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunnelCategory {
    Ecommerce,
    LeadGen,
    Saas,
    Coaching,
    Agency,
}

impl FunnelCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelCategory::Ecommerce => "ecommerce",
            FunnelCategory::LeadGen => "lead-gen",
            FunnelCategory::Saas => "saas",
            FunnelCategory::Coaching => "coaching",
            FunnelCategory::Agency => "agency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FunnelCategory::Ecommerce => "E-commerce",
            FunnelCategory::LeadGen => "Lead Generation",
            FunnelCategory::Saas => "SaaS",
            FunnelCategory::Coaching => "Coaching",
            FunnelCategory::Agency => "Agency",
        }
    }
}

impl core::str::FromStr for FunnelCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecommerce" => Ok(FunnelCategory::Ecommerce),
            "lead-gen" => Ok(FunnelCategory::LeadGen),
            "saas" => Ok(FunnelCategory::Saas),
            "coaching" => Ok(FunnelCategory::Coaching),
            "agency" => Ok(FunnelCategory::Agency),
            other => Err(DomainError::validation(format!(
                "unknown funnel category: {other}"
            ))),
        }
    }
}

/// An auctioned sales funnel, as shown on the marketplace board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelListing {
    pub id: ListingId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: FunnelCategory,
    #[serde(default)]
    pub images: Vec<String>,
    pub starting_bid: Money,
    pub current_bid: Money,
    #[serde(default)]
    pub highest_bidder: Option<String>,
    #[serde(default)]
    pub bids_count: u32,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub is_new: bool,
}

fn default_active() -> bool {
    true
}

impl FunnelListing {
    /// The lowest bid the bid form accepts.
    pub fn minimum_next_bid(&self) -> Money {
        self.current_bid + BID_INCREMENT
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        TimeRemaining::between(self.end_time, now)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// Still open, but closing within [`ENDING_SOON_HOURS`].
    pub fn is_ending_soon(&self, now: DateTime<Utc>) -> bool {
        !self.has_ended(now) && self.end_time - now < TimeDelta::hours(ENDING_SOON_HOURS)
    }
}

/// Countdown shown on a listing card.
///
/// Renders as `Ended`, `"{d}d {h}h"` once more than a day is left, and
/// `"{h}h {m}m"` otherwise. Partial units are truncated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimeRemaining {
    Ended,
    Left { hours: i64, minutes: i64 },
}

impl TimeRemaining {
    pub fn between(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if end <= now {
            return TimeRemaining::Ended;
        }
        let left = end - now;
        TimeRemaining::Left {
            hours: left.num_hours(),
            minutes: left.num_minutes() % 60,
        }
    }
}

impl ValueObject for TimeRemaining {}

impl core::fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            TimeRemaining::Ended => f.write_str("Ended"),
            TimeRemaining::Left { hours, .. } if hours > 24 => {
                write!(f, "{}d {}h", hours / 24, hours % 24)
            }
            TimeRemaining::Left { hours, minutes } => write!(f, "{hours}h {minutes}m"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn listing(id: &str, end_in: TimeDelta, now: DateTime<Utc>) -> FunnelListing {
        FunnelListing {
            id: ListingId::new(id),
            title: format!("Funnel {id}"),
            description: String::new(),
            category: FunnelCategory::Ecommerce,
            images: vec![],
            starting_bid: Money::from_dollars(500),
            current_bid: Money::from_dollars(1250),
            highest_bidder: None,
            bids_count: 0,
            end_time: now + end_in,
            is_active: true,
            features: vec![],
            tech_stack: vec![],
            is_new: false,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn countdown_formats() {
        let now = now();
        let render = |d: TimeDelta| TimeRemaining::between(now + d, now).to_string();

        assert_eq!(render(TimeDelta::minutes(135)), "2h 15m");
        assert_eq!(render(TimeDelta::hours(24)), "24h 0m");
        assert_eq!(render(TimeDelta::hours(25) + TimeDelta::minutes(59)), "1d 1h");
        assert_eq!(render(TimeDelta::hours(72)), "3d 0h");
        assert_eq!(render(TimeDelta::seconds(59)), "0h 0m");
    }

    #[test]
    fn countdown_ended_at_and_after_end() {
        let now = now();
        assert_eq!(TimeRemaining::between(now, now), TimeRemaining::Ended);
        assert_eq!(
            TimeRemaining::between(now - TimeDelta::minutes(1), now).to_string(),
            "Ended"
        );
    }

    #[test]
    fn minimum_next_bid_adds_increment() {
        let l = listing("1", TimeDelta::hours(2), now());
        assert_eq!(l.minimum_next_bid(), Money::from_dollars(1275));
    }

    #[test]
    fn ending_soon_window() {
        let now = now();
        assert!(listing("a", TimeDelta::hours(2), now).is_ending_soon(now));
        assert!(!listing("b", TimeDelta::hours(3), now).is_ending_soon(now));
        assert!(!listing("c", -TimeDelta::hours(1), now).is_ending_soon(now));
    }

    #[test]
    fn category_ids_round_trip_through_from_str() {
        for c in [
            FunnelCategory::Ecommerce,
            FunnelCategory::LeadGen,
            FunnelCategory::Saas,
            FunnelCategory::Coaching,
            FunnelCategory::Agency,
        ] {
            assert_eq!(c.as_str().parse::<FunnelCategory>().unwrap(), c);
        }
        assert!("webinar".parse::<FunnelCategory>().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "id": "6",
            "title": "Webinar Funnel",
            "category": "lead-gen",
            "starting_bid": 40000,
            "current_bid": 72500,
            "end_time": "2024-06-02T12:00:00Z"
        }"#;
        let l: FunnelListing = serde_json::from_str(json).unwrap();

        assert_eq!(l.category, FunnelCategory::LeadGen);
        assert!(l.is_active);
        assert_eq!(l.bids_count, 0);
        assert_eq!(l.time_remaining(now()).to_string(), "24h 0m");
    }
}
