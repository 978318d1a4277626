//! Runtime systems shared by the engine and the tools.

/// User-facing notifications: log, forward to the host page, show as toasts.
///
/// Toasts only appear on native builds; the host page shows its own on the web.
pub mod notifications;
