use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod domains;
pub mod health;
pub mod invoices;
pub mod nif;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod webhooks;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/domains", domains::router())
        .nest("/nif", nif::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/payments", payments::router())
        .nest("/webhooks", webhooks::router())
        .nest("/admin", admin::router())
}
