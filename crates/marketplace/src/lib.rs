//! Funnel marketplace, read side only.
//!
//! Listings are loaded from a document, then filtered, sorted and summarised
//! for display, and the user's own bids are grouped by auction outcome.
//! Placing bids is not part of this crate.

pub mod board;
pub mod listing;

pub use board::{
    Bid, BidView, Board, BoardLoadError, ListingFilter, ListingSort, MarketStats, MyBids,
};
pub use listing::{
    BID_INCREMENT, ENDING_SOON_HOURS, FunnelCategory, FunnelListing, ListingId, TimeRemaining,
};
