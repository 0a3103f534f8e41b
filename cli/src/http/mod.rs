//! HTTP front end: `POST /api/v1/plan`, `GET /health`, `POST /api/v1/shutdown`.

pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub use models::*;
pub use server::*;
pub use state::*;
