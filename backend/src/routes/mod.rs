//! Route definitions for the Procurement Contract Management Platform

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Project management
        .nest("/projects", project_routes())
        // Contract management and sub-resources
        .nest("/contracts", contract_routes())
        // Payment entries addressed by their own ID
        .nest("/payments", payment_routes())
        // Inventory commitments addressed by their own ID
        .nest("/inventory", inventory_routes())
        // File volumes and links addressed by their own ID
        .nest("/files", file_routes())
        .nest("/links", link_routes())
        // Reference data
        .nest("/parties", party_routes())
        .nest("/currencies", currency_routes())
        .nest("/products", product_routes())
}

/// Project management routes
fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/:project_id",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
}

/// Contract management routes
fn contract_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_contracts).post(handlers::create_contract),
        )
        .route(
            "/:contract_id",
            get(handlers::get_contract)
                .put(handlers::update_contract)
                .delete(handlers::delete_contract),
        )
        .route("/:contract_id/status", put(handlers::change_contract_status))
        // Payment ledger
        .route(
            "/:contract_id/payments",
            get(handlers::list_payments).post(handlers::create_payment),
        )
        .route(
            "/:contract_id/payments/finish",
            post(handlers::finish_payment),
        )
        // Inventory commitments
        .route(
            "/:contract_id/inventory",
            get(handlers::get_inventory).post(handlers::add_product_contract),
        )
        // Attachments
        .route(
            "/:contract_id/files",
            get(handlers::list_files).post(handlers::upload_file),
        )
        .route(
            "/:contract_id/links",
            get(handlers::list_links).post(handlers::create_link),
        )
}

/// Payment routes addressed by payment ID
fn payment_routes() -> Router<AppState> {
    Router::new().route("/:payment_id/cancel", post(handlers::cancel_payment))
}

/// Inventory routes addressed by commitment ID
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:inventory_id",
            put(handlers::update_inventory).delete(handlers::delete_inventory),
        )
        .route(
            "/:inventory_id/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
}

/// File volume routes addressed by file ID
fn file_routes() -> Router<AppState> {
    Router::new().route(
        "/:file_id",
        get(handlers::download_file).delete(handlers::delete_file),
    )
}

/// External link routes addressed by link ID
fn link_routes() -> Router<AppState> {
    Router::new().route("/:link_id", delete(handlers::delete_link))
}

/// Party management routes
fn party_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_parties).post(handlers::create_party),
        )
        .route(
            "/:party_id",
            get(handlers::get_party)
                .put(handlers::update_party)
                .delete(handlers::delete_party),
        )
}

/// Currency management routes
fn currency_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_currencies).post(handlers::create_currency),
        )
        .route(
            "/:currency_id",
            get(handlers::get_currency)
                .put(handlers::update_currency)
                .delete(handlers::delete_currency),
        )
}

/// Product management routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}
