use std::collections::HashSet;
use std::io::Read;

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cashless_core::{DomainError, DomainResult, Money};

use crate::listing::{FunnelCategory, FunnelListing, ListingId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingFilter {
    #[default]
    All,
    Only(FunnelCategory),
}

impl ListingFilter {
    pub fn matches(&self, listing: &FunnelListing) -> bool {
        match self {
            ListingFilter::All => true,
            ListingFilter::Only(category) => listing.category == *category,
        }
    }
}

impl FromStr for ListingFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(ListingFilter::All);
        }
        s.parse().map(ListingFilter::Only)
    }
}

/// Board ordering. Stable: ties keep document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSort {
    /// Earliest end time first.
    #[default]
    EndingSoon,
    Newest,
    PriceLow,
    PriceHigh,
    MostBids,
}

impl FromStr for ListingSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ending-soon" => Ok(ListingSort::EndingSoon),
            "newest" => Ok(ListingSort::Newest),
            "price-low" => Ok(ListingSort::PriceLow),
            "price-high" => Ok(ListingSort::PriceHigh),
            "most-bids" => Ok(ListingSort::MostBids),
            other => Err(DomainError::validation(format!("unknown sort order: {other}"))),
        }
    }
}

/// Headline figures above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketStats {
    pub listings: usize,
    pub total_bid_value: Money,
    pub total_bids: u64,
}

#[derive(Debug, Error)]
pub enum BoardLoadError {
    #[error("listings document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// A bid the signed-in user placed on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub listing_id: ListingId,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
    /// Whether this is currently the highest bid on the listing.
    #[serde(default)]
    pub is_winning: bool,
}

/// A bid next to the listing it was placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidView<'a> {
    pub bid: &'a Bid,
    pub listing: &'a FunnelListing,
}

impl BidView<'_> {
    /// The listing's current top bid. For a lost auction, the price it went for.
    pub fn winning_bid(&self) -> Money {
        self.listing.current_bid
    }

    pub fn is_leading(&self) -> bool {
        self.bid.is_winning
    }
}

/// The user's bids split by auction outcome, in the order they were given.
///
/// A bid is active while its listing is open. Once the listing closes the
/// bid counts as won if it was the winning bid, lost otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MyBids<'a> {
    pub active: Vec<BidView<'a>>,
    pub won: Vec<BidView<'a>>,
    pub lost: Vec<BidView<'a>>,
}

impl MyBids<'_> {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn won_count(&self) -> usize {
        self.won.len()
    }

    pub fn lost_count(&self) -> usize {
        self.lost.len()
    }

    /// Open auctions where the user's bid is on top.
    pub fn leading_count(&self) -> usize {
        self.active.iter().filter(|v| v.is_leading()).count()
    }

    /// Sum of the user's bids on open auctions.
    pub fn active_value(&self) -> Money {
        self.active.iter().map(|v| v.bid.amount).sum()
    }
}

/// All listings on offer, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    listings: Vec<FunnelListing>,
}

impl Board {
    pub fn new(listings: Vec<FunnelListing>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        for l in &listings {
            if l.id.as_str().trim().is_empty() {
                return Err(DomainError::validation("listing id cannot be empty"));
            }
            if l.current_bid < l.starting_bid {
                return Err(DomainError::validation(format!(
                    "listing {}: current bid below starting bid",
                    l.id
                )));
            }
            if !seen.insert(l.id.clone()) {
                return Err(DomainError::conflict(format!("duplicate listing id {}", l.id)));
            }
        }
        Ok(Self { listings })
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, BoardLoadError> {
        let listings: Vec<FunnelListing> = serde_json::from_reader(reader)?;
        Ok(Self::new(listings)?)
    }

    pub fn listings(&self) -> &[FunnelListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &ListingId) -> Option<&FunnelListing> {
        self.listings.iter().find(|l| &l.id == id)
    }

    pub fn browse(&self, filter: ListingFilter, sort: ListingSort) -> Vec<&FunnelListing> {
        let mut out: Vec<&FunnelListing> =
            self.listings.iter().filter(|l| filter.matches(l)).collect();

        match sort {
            ListingSort::EndingSoon => out.sort_by_key(|l| l.end_time),
            ListingSort::Newest => out.sort_by_key(|l| !l.is_new),
            ListingSort::PriceLow => out.sort_by_key(|l| l.current_bid),
            ListingSort::PriceHigh => out.sort_by(|a, b| b.current_bid.cmp(&a.current_bid)),
            ListingSort::MostBids => out.sort_by(|a, b| b.bids_count.cmp(&a.bids_count)),
        }

        out
    }

    /// Group the user's bids by outcome. Bids on listings not on this board
    /// are left out.
    pub fn my_bids<'a>(&'a self, bids: &'a [Bid], now: DateTime<Utc>) -> MyBids<'a> {
        let mut out = MyBids::default();

        for bid in bids {
            let Some(listing) = self.get(&bid.listing_id) else {
                continue;
            };
            let view = BidView { bid, listing };

            if listing.is_active && !listing.has_ended(now) {
                out.active.push(view);
            } else if bid.is_winning {
                out.won.push(view);
            } else {
                out.lost.push(view);
            }
        }

        out
    }

    /// Figures over every listing, regardless of any browse filter.
    pub fn stats(&self) -> MarketStats {
        MarketStats {
            listings: self.listings.len(),
            total_bid_value: self.listings.iter().map(|l| l.current_bid).sum(),
            total_bids: self.listings.iter().map(|l| u64::from(l.bids_count)).sum(),
        }
    }
}
