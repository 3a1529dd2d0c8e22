//! Common types for the boxcars craps engine.
//!
//! Everything that can be persisted or emitted on the event log implements
//! the commonware codec traits with an explicit binary layout, so state and
//! audit trails decode identically everywhere.

pub mod caller;
pub mod craps;
pub mod events;
pub mod state;

pub use caller::{Capability, GRANT_LIQUIDITY, GRANT_TABLE, GRANT_WAGER};
pub use events::Event;
pub use state::{Key, Value};
