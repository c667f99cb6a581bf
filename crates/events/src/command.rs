use cashless_core::AggregateId;

/// A command targets a specific aggregate.
///
/// Commands are **intent** ("add this hoodie in size L"); the aggregate turns
/// accepted intent into events ("line item added"). Commands are transient and
/// never stored.
///
/// Must own all of their data so they can be queued behind a UI event or
/// logged after the fact.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
