//! Field resolution for the two binding modes.
//!
//! [`AnnotationProcessor`] follows explicit column and nest bindings, and
//! [`PropertyProcessor`] matches column labels against property names. Both
//! pick each field's reader once at build time.

pub mod annotation;
pub mod property;

pub use annotation::{AnnotationProcessor, FieldNode};
pub use property::{Property, PropertyProcessor};
