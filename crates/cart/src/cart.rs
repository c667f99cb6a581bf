use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashless_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Entity, Money};
use cashless_events::{Command, Event};
use cashless_merch::{ProductId, ProductSnapshot, Variant};

/// Cart identifier (one cart per app session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Line item identifier, rendered as `line-<n>`.
///
/// Allocated from a per-cart counter that only moves forward, so an id is
/// never handed out twice even after its line is removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(u64);

impl LineItemId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line-{}", self.0)
    }
}

impl FromStr for LineItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("line-")
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| DomainError::invalid_id(format!("LineItemId: {s:?}")))
    }
}

/// One product/variant combination in the cart and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    product: ProductSnapshot,
    variant: Option<Variant>,
    quantity: u32,
}

impl LineItem {
    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn variant(&self) -> Option<&Variant> {
        self.variant.as_ref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity, exact in cents.
    pub fn line_total(&self) -> Money {
        self.product.unit_price * self.quantity
    }

    /// Same product and same variant; no variant only matches no variant.
    pub fn matches(&self, product_id: &ProductId, variant: Option<&Variant>) -> bool {
        &self.product.product_id == product_id && self.variant.as_ref() == variant
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: CartId,
    lines: Vec<LineItem>,
    next_line_no: u64,
    version: u64,
}

impl Cart {
    /// An empty cart, as every session starts with.
    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            next_line_no: 1,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn find_line(&self, product_id: &ProductId, variant: Option<&Variant>) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.matches(product_id, variant))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines (the badge number).
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of line totals. Accumulated in cents (saturating at `u64::MAX`);
    /// format with `Display` to get the two-decimal figure.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(LineItem::line_total).sum()
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub cart_id: CartId,
    pub product: ProductSnapshot,
    pub variant: Option<Variant>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateQuantity (absolute; zero removes the line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub cart_id: CartId,
    pub line_item_id: LineItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub cart_id: CartId,
    pub line_item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    UpdateQuantity(UpdateQuantity),
    RemoveItem(RemoveItem),
}

impl Command for CartCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            CartCommand::AddItem(cmd) => cmd.cart_id.0,
            CartCommand::UpdateQuantity(cmd) => cmd.cart_id.0,
            CartCommand::RemoveItem(cmd) => cmd.cart_id.0,
        }
    }
}

/// Event: LineItemAdded (a new line at the end of the cart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAdded {
    pub cart_id: CartId,
    pub line_item_id: LineItemId,
    pub product: ProductSnapshot,
    pub variant: Option<Variant>,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineItemQuantityChanged (carries the new absolute quantity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemQuantityChanged {
    pub cart_id: CartId,
    pub line_item_id: LineItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRemoved {
    pub cart_id: CartId,
    pub line_item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    LineItemAdded(LineItemAdded),
    LineItemQuantityChanged(LineItemQuantityChanged),
    LineItemRemoved(LineItemRemoved),
}

impl CartEvent {
    pub fn line_item_id(&self) -> LineItemId {
        match self {
            CartEvent::LineItemAdded(e) => e.line_item_id,
            CartEvent::LineItemQuantityChanged(e) => e.line_item_id,
            CartEvent::LineItemRemoved(e) => e.line_item_id,
        }
    }
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::LineItemAdded(_) => "cart.line_item.added",
            CartEvent::LineItemQuantityChanged(_) => "cart.line_item.quantity_changed",
            CartEvent::LineItemRemoved(_) => "cart.line_item.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::LineItemAdded(e) => e.occurred_at,
            CartEvent::LineItemQuantityChanged(e) => e.occurred_at,
            CartEvent::LineItemRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::LineItemAdded(e) => {
                self.lines.push(LineItem {
                    id: e.line_item_id,
                    product: e.product.clone(),
                    variant: e.variant.clone(),
                    quantity: e.quantity,
                });
                self.next_line_no = self.next_line_no.max(e.line_item_id.get() + 1);
            }
            CartEvent::LineItemQuantityChanged(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.id == e.line_item_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::LineItemRemoved(e) => {
                self.lines.retain(|l| l.id != e.line_item_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add(cmd),
            CartCommand::UpdateQuantity(cmd) => self.handle_update_quantity(cmd),
            CartCommand::RemoveItem(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Cart {
    fn ensure_cart_id(&self, cart_id: CartId) -> Result<(), DomainError> {
        if self.id != cart_id {
            return Err(DomainError::invariant("cart_id mismatch"));
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_cart_id(cmd.cart_id)?;

        // Merge into the existing line; its snapshot (and price) stays as first added.
        if let Some(line) = self.find_line(&cmd.product.product_id, cmd.variant.as_ref()) {
            let quantity = line
                .quantity
                .checked_add(1)
                .ok_or_else(|| DomainError::invariant("line item quantity overflow"))?;

            return Ok(vec![CartEvent::LineItemQuantityChanged(
                LineItemQuantityChanged {
                    cart_id: cmd.cart_id,
                    line_item_id: line.id,
                    quantity,
                    occurred_at: cmd.occurred_at,
                },
            )]);
        }

        Ok(vec![CartEvent::LineItemAdded(LineItemAdded {
            cart_id: cmd.cart_id,
            line_item_id: LineItemId(self.next_line_no),
            product: cmd.product.clone(),
            variant: cmd.variant.clone(),
            quantity: 1,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_quantity(&self, cmd: &UpdateQuantity) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_cart_id(cmd.cart_id)?;

        // Unknown ids come from stale UI references; nothing to do.
        if self.line_item(cmd.line_item_id).is_none() {
            return Ok(vec![]);
        }

        if cmd.quantity == 0 {
            return Ok(vec![CartEvent::LineItemRemoved(LineItemRemoved {
                cart_id: cmd.cart_id,
                line_item_id: cmd.line_item_id,
                occurred_at: cmd.occurred_at,
            })]);
        }

        Ok(vec![CartEvent::LineItemQuantityChanged(
            LineItemQuantityChanged {
                cart_id: cmd.cart_id,
                line_item_id: cmd.line_item_id,
                quantity: cmd.quantity,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_cart_id(cmd.cart_id)?;

        if self.line_item(cmd.line_item_id).is_none() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::LineItemRemoved(LineItemRemoved {
            cart_id: cmd.cart_id,
            line_item_id: cmd.line_item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
