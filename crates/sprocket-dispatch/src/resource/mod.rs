//! Per-invocation backend resources
//!
//! Array arguments have to be turned into backend array handles before they
//! can be bound, and every handle has to be freed once the call is done. A
//! [`CallResourceFactory`] is part of the cached descriptor; the
//! [`CallResource`] it creates lives for exactly one invocation.

mod factory;

pub use factory::{ArrayResource, ArraySlot, CallResource, CallResourceFactory};
