//! Call descriptors
//!
//! A [`CallDescriptor`] is everything needed to invoke one method: the call
//! string, the binder, the out-parameter registrar, the result extractor and
//! the resource factory. [`DescriptorBuilder`] derives it from a
//! [`crate::MethodSignature`] and the caller configuration.

mod builder;

pub use builder::{CallDescriptor, DescriptorBuilder, input_positions};

#[cfg(test)]
mod tests;
