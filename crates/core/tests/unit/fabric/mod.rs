//! Unit tests for the inter-component fabric.

/// Wire buffering, delivery, and overflow behavior.
pub mod wire;
