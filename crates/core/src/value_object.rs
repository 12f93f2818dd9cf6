//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Inference outputs and form readings are values: two diagnoses with the same
/// fields are the same diagnosis, and nothing mutates them after construction.
/// A workflow that wants a different result replaces the value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
