//! Result extraction
//!
//! A [`ResultExtractor`] executes the prepared call and shapes what comes
//! back into the method's declared return type, reading either the produced
//! row set or the registered output slot.

mod extractor;

pub use extractor::ResultExtractor;
