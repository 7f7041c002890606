//! Unit tests for the core: decode, dispatch, pipeline engine, functional
//! units, and the composed SCore scenarios.

/// Dispatch rules over multi-instruction groups.
pub mod dispatch;
/// Generic pipeline engine behaviors.
pub mod pipeline;
/// Functional-unit behavior through ports and ticks.
pub mod units;
