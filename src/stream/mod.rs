//! Streaming support: lookahead and bounded iteration, idempotent cleanup
//! and the spill-to-disk body reader

mod bounded;
mod cleanup;
mod lookahead;
mod spill;

pub use bounded::Bounded;
pub use cleanup::Cleanup;
pub use lookahead::Lookahead;
pub use spill::{DrainHandle, SpillOptions, SpillReader};
