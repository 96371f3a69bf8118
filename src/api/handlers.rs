use crate::error::AppError;
use crate::models::OcrInvoice;
use crate::service::{InvoiceMatchService, SubmittedInvoice};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// 失败响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 提交成功响应体
#[derive(Debug, Serialize)]
pub struct SubmitInvoiceResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub invoice: SubmittedInvoice,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match &self {
            AppError::Validation(msg) => tracing::warn!("Rejected invoice payload: {}", msg),
            other => tracing::error!("Request failed: {}", other),
        }

        let response = ErrorResponse {
            success: false,
            message: format!("Error: {}", self),
        };
        (status, Json(response)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 匹配预览接口 (不入库)
pub async fn match_invoice(
    State(service): State<Arc<InvoiceMatchService>>,
    Json(payload): Json<OcrInvoice>,
) -> Response {
    match service.preview(payload).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 发票提交接口: 匹配、审批判定并入库
pub async fn submit_invoice(
    State(service): State<Arc<InvoiceMatchService>>,
    Json(payload): Json<OcrInvoice>,
) -> Response {
    match service.submit(payload).await {
        Ok(invoice) => {
            let response = SubmitInvoiceResponse {
                success: true,
                message: format!(
                    "Invoice {} saved as {} (score {:.2}, {} flags)",
                    invoice.invoice_number,
                    invoice.status.as_str(),
                    invoice.matching_results.overall_score,
                    invoice.matching_results.flags.len()
                ),
                invoice,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
