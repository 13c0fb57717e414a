//! # tally-server
//!
//! HTTP API for the Tally expense tracker.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/expenses?user=U&month=M` | One month record |
//! | `GET` | `/expenses?user=U` | Everything stored for one user |
//! | `POST` | `/expenses` | Login (`{isAuth: true, ...}`) or save a month |
//! | `DELETE` | `/expenses?user=U&month=M` | Delete a month record |
//! | `GET` | `/expenses/summary?user=U&month=M` | Month totals |
//! | `GET` | `/categories` | Expense categories |
//! | `GET` | `/health` | Liveness |
//!
//! Every route except `/health` is also served under `/api`. Errors are
//! JSON `{"error": "..."}` bodies with 400, 401, 404, 409 or 500 status.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::TallyServer;
pub use state::AppState;
