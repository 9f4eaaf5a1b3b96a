//! Sprocket Dispatch - Typed stored procedure calls
//!
//! Turns a declared method signature into a database round trip. For every
//! method a [`CallDescriptor`] is derived once (call string, in-parameter
//! binding, out-parameter registration, result shaping, array resources) and
//! cached by the [`ProcedureCaller`], so repeated invocations only pay for
//! execution.
//!
//! The crate is organized leaves first:
//!
//! - `call` - call string builder and type mapping
//! - `binding` - in-parameter binders and the out-parameter registrar
//! - `resource` - array resources scoped to one invocation
//! - `extract` - result extractors (void, scalar, list, array)
//! - `descriptor` - composition of the above from a method signature
//! - `caller` - the dispatcher with its descriptor cache

pub mod binding;
pub mod call;
pub mod caller;
pub mod descriptor;
pub mod extract;
pub mod resource;

mod argument;
mod config;
mod error;
mod from_value;
mod metadata;
mod naming;

pub use argument::*;
pub use binding::{InParameterBinder, NOT_BOUND, OutParameterRegistrar};
pub use call::{
    ArrayTypeNameResolver, DefaultTypeMapper, ORACLE_PLSQL_BOOLEAN, OracleTypeMapper, TypeMapper,
    build_call_string,
};
pub use caller::ProcedureCaller;
pub use config::*;
pub use descriptor::{CallDescriptor, DescriptorBuilder, input_positions};
pub use error::*;
pub use extract::ResultExtractor;
pub use from_value::FromValue;
pub use metadata::*;
pub use naming::*;
pub use resource::{ArraySlot, CallResource, CallResourceFactory};

pub use sprocket_core::{ArrayElement, Connection, Row, ScalarKind, SqlType, Value};
