//! Grey system helpers: whitening of incomplete observations and grey relational analysis.

mod relation;
mod whitening;

pub use relation::grey_relation;
pub use whitening::{field_default, GreyParameters, GreyWhitener, MAX_INFERRED_CONFIDENCE};
