//! Sprocket mock driver
//!
//! A scripted, in-memory implementation of the `sprocket-core` traits. Each
//! call string can be given a [`CallScript`] describing what the "database"
//! returns; everything the pipeline does to the connection is recorded so
//! tests can assert on binds, registrations, fetch sizes and array frees.

mod array;
mod connection;
mod statement;

pub use array::{ArrayData, MockArray};
pub use connection::{ArrayRecord, Binding, CallRecord, CallScript, MockConnection, OwnedSlot};
pub use statement::{MockResultSet, MockStatement};

#[cfg(test)]
mod tests;
