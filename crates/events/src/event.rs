use chrono::{DateTime, Utc};

/// A domain event: an immutable fact about something that already happened
/// (e.g. "line item added", "invite code accepted").
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "cart.line_item.added").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the user action that produced the event happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
