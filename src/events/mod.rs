pub mod bus;
pub mod messages;

pub use bus::{EventBus, SubscriptionId};
pub use messages::{EventKind, GameCommand, GameEvent, RosterEntry};
