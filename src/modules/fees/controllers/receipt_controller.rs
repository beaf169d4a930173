use actix_web::{http::header::ContentType, web, HttpResponse};
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::fees::models::PaymentTransaction;
use crate::modules::fees::services::ReceiptFormatter;
use crate::modules::records::repositories::RecordStore;

/// GET /fees/{id}/receipt
///
/// Renders the stored transaction as a printable HTML receipt.
pub async fn get_receipt(
    store: web::Data<dyn RecordStore>,
    formatter: web::Data<ReceiptFormatter>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let transaction_id = path.into_inner();
    let transaction = store
        .transaction_by_id(&transaction_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Transaction '{}' not found", transaction_id)))?;

    info!(
        transaction_id = %transaction.id,
        receipt_number = %transaction.receipt_number,
        "Rendering fee receipt"
    );

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(formatter.format(&transaction)))
}

/// POST /fees/receipt/preview
///
/// Renders a receipt for a transaction posted by the fee-collection form before it is saved.
pub async fn preview_receipt(
    formatter: web::Data<ReceiptFormatter>,
    body: web::Json<PaymentTransaction>,
) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(formatter.format(&body))
}

/// Configure routes for fees module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fees")
            .route("/receipt/preview", web::post().to(preview_receipt))
            .route("/{id}/receipt", web::get().to(get_receipt)),
    );
}
