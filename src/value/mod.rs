pub mod foreign;
pub mod types;

pub use foreign::ForeignValue;
pub use types::{Boxed, ListRef, MapRef, Value};
