//! Sprocket Core - Backend abstractions for stored procedure calls
//!
//! This crate provides the types and traits the call-dispatch pipeline in
//! `sprocket-dispatch` is written against. It defines:
//!
//! - `Connection` - Trait for a database handle that prepares calls and creates arrays
//! - `CallableStatement` - A prepared `{call ...}` statement with in/out parameters
//! - `ResultSet` - Rows produced by an executed call
//! - `SqlArray` - A backend array handle scoped to one invocation
//! - `SqlType` - Backend parameter type codes
//! - Common types like `Value`, `Row`, `ScalarKind`, etc.

mod connection;
mod error;
mod sql_type;
mod types;

pub use connection::*;
pub use error::*;
pub use sql_type::*;
pub use types::*;
