//! The procedure caller
//!
//! [`ProcedureCaller`] is the entry point: it owns a connection, an interface
//! definition and a configuration, lazily builds one
//! [`crate::CallDescriptor`] per method and runs invocations through it.

mod dispatcher;

pub use dispatcher::ProcedureCaller;

#[cfg(test)]
mod tests;
