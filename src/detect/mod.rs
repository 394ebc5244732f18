//! Eye location capability.

/// Locator trait and result types.
pub mod locator;
/// Locator backed by manifest landmarks.
pub mod manifest;
