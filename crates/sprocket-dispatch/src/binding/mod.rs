//! Parameter binding
//!
//! [`InParameterBinder`] copies invocation arguments into a prepared call,
//! addressing placeholders by position or by name, with or without explicit
//! type codes. [`OutParameterRegistrar`] registers the single output slot and
//! reads it back after execution.

mod in_parameters;
mod out_parameter;

pub use in_parameters::{InParameterBinder, NOT_BOUND};
pub use out_parameter::OutParameterRegistrar;
