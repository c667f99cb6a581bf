use anyhow::Context;

use cashless_app::{AppConfig, Shell};
use cashless_marketplace::{ListingFilter, ListingSort};
use cashless_merch::{CategoryFilter, SortOrder};

fn main() -> anyhow::Result<()> {
    cashless_observability::init();

    let config = AppConfig::from_env().context("reading configuration")?;
    let shell = Shell::from_config(&config).context("starting session")?;

    let stats = shell.board().stats();
    tracing::info!(
        session_id = %shell.session_id(),
        invite_codes = config.invite_codes.len(),
        merch_items = shell.catalog().len(),
        listings = stats.listings,
        total_bid_value = %stats.total_bid_value,
        total_bids = stats.total_bids,
        "session ready"
    );

    for item in shell.catalog().browse(CategoryFilter::All, SortOrder::default()) {
        tracing::debug!(product_id = %item.id, price = %item.price, "merch item");
    }

    let now = chrono::Utc::now();
    for listing in shell.board().browse(ListingFilter::All, ListingSort::default()) {
        tracing::debug!(
            listing_id = %listing.id,
            current_bid = %listing.current_bid,
            time_remaining = %listing.time_remaining(now),
            "funnel listing"
        );
    }

    Ok(())
}
