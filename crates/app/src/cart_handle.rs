use chrono::Utc;
use uuid::Uuid;

use cashless_cart::{AddItem, Cart, CartCommand, CartEvent, CartId, LineItemId, RemoveItem, UpdateQuantity};
use cashless_core::{AggregateRoot, DomainResult, SessionId};
use cashless_events::{Event, EventBus, EventEnvelope, execute};
use cashless_merch::{MerchItem, ProductSnapshot, Variant, select_variant};

/// Envelope type carried on a session's cart bus.
pub type CartEnvelope = EventEnvelope<CartEvent>;

pub const CART_AGGREGATE_TYPE: &str = "cart";

/// The session's cart, as lent to views.
///
/// Each operation runs its command to completion before returning, so the
/// caller can read `cart()` straight away. Applied events are published on
/// the bus after the state change; a failed publish is logged, never undone.
#[derive(Debug)]
pub struct CartHandle<B> {
    session_id: SessionId,
    cart: Cart,
    bus: B,
}

impl<B> CartHandle<B>
where
    B: EventBus<CartEnvelope>,
{
    pub fn new(session_id: SessionId, cart_id: CartId, bus: B) -> Self {
        Self {
            session_id,
            cart: Cart::empty(cart_id),
            bus,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit, merging with an existing (product, variant) line.
    pub fn add(&mut self, product: ProductSnapshot, variant: Option<Variant>) -> DomainResult<Vec<CartEvent>> {
        self.dispatch(CartCommand::AddItem(AddItem {
            cart_id: self.cart.id_typed(),
            product,
            variant,
            occurred_at: Utc::now(),
        }))
    }

    /// Validate the chosen size against the catalog item, then add it.
    pub fn add_from_catalog(&mut self, item: &MerchItem, chosen_size: Option<&str>) -> DomainResult<Vec<CartEvent>> {
        let variant = select_variant(item, chosen_size)?;
        self.add(item.snapshot(), variant)
    }

    /// Set the absolute quantity; zero removes the line.
    pub fn update_quantity(&mut self, line_item_id: LineItemId, quantity: u32) -> DomainResult<Vec<CartEvent>> {
        let events = self.dispatch(CartCommand::UpdateQuantity(UpdateQuantity {
            cart_id: self.cart.id_typed(),
            line_item_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;
        self.note_stale(line_item_id, &events);
        Ok(events)
    }

    pub fn remove(&mut self, line_item_id: LineItemId) -> DomainResult<Vec<CartEvent>> {
        let events = self.dispatch(CartCommand::RemoveItem(RemoveItem {
            cart_id: self.cart.id_typed(),
            line_item_id,
            occurred_at: Utc::now(),
        }))?;
        self.note_stale(line_item_id, &events);
        Ok(events)
    }

    /// Number shown on the cart tab; `None` hides the badge.
    pub fn badge(&self) -> Option<u64> {
        match self.cart.total_item_count() {
            0 => None,
            n => Some(n),
        }
    }

    fn dispatch(&mut self, command: CartCommand) -> DomainResult<Vec<CartEvent>> {
        let base_version = self.cart.version();
        let events = execute(&mut self.cart, &command)?;

        let cart_id = self.cart.id_typed().0;
        for (sequence, event) in (base_version + 1..).zip(&events) {
            tracing::debug!(
                session_id = %self.session_id,
                line_item_id = %event.line_item_id(),
                event_type = event.event_type(),
                sequence,
                "cart event applied"
            );

            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                self.session_id,
                cart_id,
                CART_AGGREGATE_TYPE,
                sequence,
                event.clone(),
            );
            if let Err(err) = self.bus.publish(envelope) {
                tracing::warn!(
                    session_id = %self.session_id,
                    event_type = event.event_type(),
                    "cart event publish failed: {err:?}"
                );
            }
        }

        Ok(events)
    }

    fn note_stale(&self, line_item_id: LineItemId, events: &[CartEvent]) {
        if events.is_empty() {
            tracing::warn!(
                session_id = %self.session_id,
                line_item_id = %line_item_id,
                "stale line item reference ignored"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use cashless_core::{AggregateId, Money};
    use cashless_events::InMemoryEventBus;
    use cashless_merch::{MerchCategory, ProductId};

    fn handle() -> (CartHandle<Arc<InMemoryEventBus<CartEnvelope>>>, Arc<InMemoryEventBus<CartEnvelope>>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let h = CartHandle::new(SessionId::new(), CartId::new(AggregateId::new()), bus.clone());
        (h, bus)
    }

    fn tee() -> MerchItem {
        MerchItem {
            id: ProductId::new("tee"),
            name: "Tour Tee".into(),
            price: Money::from_cents(3500),
            images: vec![],
            description: String::new(),
            category: MerchCategory::Clothing,
            sizes: vec!["S".into(), "M".into(), "L".into()],
            stock: 10,
            is_new: false,
        }
    }

    #[test]
    fn envelopes_follow_cart_version() {
        let (mut h, bus) = handle();
        let sub = bus.subscribe();

        h.add_from_catalog(&tee(), Some("M")).unwrap();
        h.add_from_catalog(&tee(), Some("M")).unwrap();

        let seqs: Vec<u64> = sub.drain().iter().map(|e| e.sequence_number()).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(h.cart().version(), 2);
        assert_eq!(h.badge(), Some(2));
    }

    #[test]
    fn selection_errors_leave_cart_untouched() {
        let (mut h, bus) = handle();
        let sub = bus.subscribe();

        assert!(h.add_from_catalog(&tee(), None).is_err());
        assert!(h.add_from_catalog(&tee(), Some("XXL")).is_err());

        assert!(h.cart().is_empty());
        assert!(sub.drain().is_empty());
        assert_eq!(h.badge(), None);
    }

    #[test]
    fn stale_reference_publishes_nothing() {
        let (mut h, bus) = handle();
        let sub = bus.subscribe();

        assert!(h.update_quantity(LineItemId::new(42), 3).unwrap().is_empty());
        assert!(h.remove(LineItemId::new(42)).unwrap().is_empty());
        assert!(sub.drain().is_empty());
        assert_eq!(h.cart().version(), 0);
    }
}
