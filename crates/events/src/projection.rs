use crate::{Event, EventEnvelope};

/// A projection builds a read model from an ordered event stream.
///
/// Read models are disposable: the aggregate is the source of truth, and a
/// projection can always be rebuilt by replaying the stream from the start.
/// Implementations should ignore envelopes that are not theirs (other session,
/// already-seen sequence number) rather than fail.
pub trait Projection {
    type Ev: Event;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
