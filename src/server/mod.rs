//! HTTP surface of the service.
//!
//! Thin axum handlers over the atmosphere mapper, the recommendation parser
//! and the upstream clients. Errors leave as `{"error": "..."}` with a
//! matching status code.

pub mod routes;
pub mod spotify;
pub mod state;

pub use routes::app_router;
pub use state::AppState;
