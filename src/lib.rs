//! Declarative construction and packing of C-compatible binary struct layouts.

/// Type model, value tree, struct builder, and the packing engine.
pub mod layout;
