// Typed query filters. Each filter renders a BSON document for the Mongo
// stores and an equivalent predicate + ordering for the in-memory stores.
pub mod text;
pub mod types;

pub use text::clamp_limit;
pub use types::*;
