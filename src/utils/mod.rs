pub mod coercion;
pub mod serde;

pub use coercion::{BooleanCoercion, Coerced, CoercionError};
