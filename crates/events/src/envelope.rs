use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cashless_core::{AggregateId, SessionId};

/// Envelope for an event, carrying session and stream metadata.
///
/// - `session_id` scopes the event to one app session; nothing crosses sessions.
/// - `sequence_number` is the aggregate version after the event was applied,
///   so it increases by one per event within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    session_id: SessionId,

    aggregate_id: AggregateId,
    aggregate_type: String,

    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        session_id: SessionId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            session_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
