//! Cart badge read model.

use std::collections::BTreeMap;

use cashless_cart::{CartEvent, LineItemId};
use cashless_core::{AggregateId, SessionId};
use cashless_events::{EventEnvelope, Projection};

/// Rebuilds the cart tab's item count from published cart envelopes.
///
/// Follows the session's current cart: an envelope from a different cart
/// aggregate (a fresh cart after signing in again) resets the count and the
/// cursor. Envelopes from other sessions, and sequence numbers already seen
/// for the current cart, are skipped so a redelivery cannot double count.
#[derive(Debug, Clone)]
pub struct CartBadgeProjection {
    session_id: SessionId,
    cart_id: Option<AggregateId>,
    last_sequence: u64,
    quantities: BTreeMap<LineItemId, u32>,
}

impl CartBadgeProjection {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            cart_id: None,
            last_sequence: 0,
            quantities: BTreeMap::new(),
        }
    }

    pub fn item_count(&self) -> u64 {
        self.quantities.values().map(|q| u64::from(*q)).sum()
    }

    pub fn badge(&self) -> Option<u64> {
        match self.item_count() {
            0 => None,
            n => Some(n),
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// The cart aggregate currently being followed.
    pub fn cart_id(&self) -> Option<AggregateId> {
        self.cart_id
    }
}

impl Projection for CartBadgeProjection {
    type Ev = CartEvent;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) {
        if envelope.session_id() != self.session_id {
            return;
        }
        if self.cart_id != Some(envelope.aggregate_id()) {
            self.cart_id = Some(envelope.aggregate_id());
            self.last_sequence = 0;
            self.quantities.clear();
        }
        if envelope.sequence_number() <= self.last_sequence {
            return;
        }

        match envelope.payload() {
            CartEvent::LineItemAdded(e) => {
                self.quantities.insert(e.line_item_id, e.quantity);
            }
            CartEvent::LineItemQuantityChanged(e) => {
                self.quantities.insert(e.line_item_id, e.quantity);
            }
            CartEvent::LineItemRemoved(e) => {
                self.quantities.remove(&e.line_item_id);
            }
        }

        self.last_sequence = envelope.sequence_number();
    }
}
