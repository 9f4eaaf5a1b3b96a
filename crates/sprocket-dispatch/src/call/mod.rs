//! Call strings and type mapping
//!
//! Leaves of the dispatch pipeline: [`build_call_string`] renders the escape
//! syntax handed to [`sprocket_core::Connection::prepare_call`], and
//! [`TypeMapper`] turns declared kinds into backend type codes.

mod call_string;
mod type_mapper;

pub use call_string::build_call_string;
pub use type_mapper::{
    ArrayTypeNameResolver, DefaultTypeMapper, ORACLE_PLSQL_BOOLEAN, OracleTypeMapper, TypeMapper,
};
