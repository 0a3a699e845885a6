//! Application layer with services and use cases.

/// Long-lived services.
pub mod services;
/// One-shot use cases.
pub mod use_cases;
