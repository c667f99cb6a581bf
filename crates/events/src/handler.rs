/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: `aggregate.handle(command)` returns events without mutating.
/// 2. **Evolve**: each event is applied in order.
///
/// The returned events are exactly the ones applied; an empty vector means the
/// command was a no-op. Callers observe the new state as soon as this returns.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: cashless_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
