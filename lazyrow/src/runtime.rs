//! Evaluates generated class descriptions.
//!
//! The runtime executes exactly what the factories encode: accessor
//! coercions, partial updates, memoized schema proxies and statement slots.
//! Database access goes through the [`Connection`] and [`Statement`] traits.

mod coerce;
mod context;
mod eval;
mod inflate;
mod statement;

pub use coerce::{decode_json, float_value, to_bool, to_float, to_int};
pub use context::{Capability, RuntimeContext};
pub use eval::Instance;
pub use inflate::{ColumnInflator, InflatorRegistry, TypeInflator};
pub use statement::{Connection, ConnectionResolver, Params, Statement, StatementSlots};
