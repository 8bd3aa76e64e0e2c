//! cx-core: shared error type and float helpers for the coexistence workspace.
//!
//! The float guards in [`numeric`] report through [`CxError`]; the solver wraps it
//! as its numeric error variant.

pub mod error;
pub mod numeric;

pub use error::CxError;
pub use numeric::*;
