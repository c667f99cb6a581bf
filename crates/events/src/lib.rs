//! Commands, events and the plumbing that moves them: synchronous execution
//! against an aggregate, envelopes, an in-memory bus and read-model projections.

pub mod bus;
pub mod command;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;
pub mod projection;

pub use bus::{EventBus, Subscription};
pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use projection::Projection;
