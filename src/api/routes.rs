//! API Routes
//!
//! Configures the Axum router with all finance API endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, stats_handler, AppState};
use super::{accounts, dashboard, savings, transactions};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/accounts/:id",
            put(accounts::update_account).delete(accounts::delete_account),
        )
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/bulk",
            post(transactions::create_transactions_bulk),
        )
        .route(
            "/transactions/:id",
            put(transactions::update_transaction).delete(transactions::delete_transaction),
        )
        .route(
            "/savings",
            get(savings::list_savings).post(savings::create_savings),
        )
        .route("/savings/:id", delete(savings::delete_savings))
        .route(
            "/savings/saving-transaction",
            get(savings::list_savings_transactions)
                .post(savings::create_savings_transaction)
                .put(savings::update_savings_transaction),
        )
        .route(
            "/savings/saving-transaction/:id",
            delete(savings::delete_savings_transaction),
        )
        .route("/dashboard/total-balance", get(dashboard::total_balance))
        .route("/dashboard/total-expense", get(dashboard::total_expense))
        .route(
            "/dashboard/category-spending",
            get(dashboard::category_spending),
        );

    Router::new()
        .nest("/api", api)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
