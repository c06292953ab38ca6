// Session identity and client preferences
//
// Both live in the injected key-value store:
// - Identity: durable session identifier, created on first use
// - Theme: dark/light display preference

pub mod identity;
pub mod theme;

// Re-export key types
pub use identity::SessionIdentity;
pub use theme::Theme;
