//! API Module
//!
//! HTTP handlers and routing for the finance REST API.
//!
//! # Endpoints
//! - `GET|POST /api/accounts`, `PUT|DELETE /api/accounts/:id`
//! - `GET|POST /api/transactions`, `POST /api/transactions/bulk`,
//!   `PUT|DELETE /api/transactions/:id`
//! - `GET|POST /api/savings`, `DELETE /api/savings/:id`
//! - `GET|POST|PUT /api/savings/saving-transaction`,
//!   `DELETE /api/savings/saving-transaction/:id`
//! - `GET /api/dashboard/total-balance`
//! - `GET /api/dashboard/total-expense`
//! - `GET /api/dashboard/category-spending`
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod accounts;
pub mod dashboard;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod savings;
pub mod transactions;

pub use handlers::*;
pub use routes::create_router;
