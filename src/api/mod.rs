pub mod handlers;

pub use handlers::*;

use crate::service::InvoiceMatchService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(service: Arc<InvoiceMatchService>) -> Router {
    let invoice_routes = Router::new()
        .route("/api/invoices/match", post(match_invoice))
        .route("/api/invoices", post(submit_invoice))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(invoice_routes)
}
