//! Feedback board backend: list, submit and upvote product feedback.
//!
//! Callers are anonymous. Each request is attributed to a voter hash derived
//! from its headers ([`identity`]), which keys both the rate limiter
//! ([`rate_limit`]) and the one-vote-per-item rule enforced by the store
//! ([`store`]).

pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use routes::router;
pub use state::AppState;
