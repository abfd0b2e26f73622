//! HTTP surface: chat streaming, landing page, probes

pub mod chat;
pub mod health;
pub mod index;
pub mod middleware;
pub mod resources;
pub mod router;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use middleware::RequireUser;
pub use router::create_router;
pub use state::AppState;
