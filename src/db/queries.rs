use crate::models::{
    Delivery, DeliveryItem, InvoiceCandidate, InvoiceStatus, MatchResult, PoItem, PoStatus,
    PurchaseOrder, StoredInvoice,
};
use crate::service::{MatchSnapshot, MatchSource};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    po_number: String,
    vendor_name: String,
    amount: BigDecimal,
    po_date: NaiveDate,
    status: String,
    items: Json<Vec<PoItem>>,
}

impl From<PurchaseOrderRow> for PurchaseOrder {
    fn from(row: PurchaseOrderRow) -> Self {
        Self {
            po_number: row.po_number,
            vendor_name: row.vendor_name,
            amount: row.amount,
            date: row.po_date,
            status: PoStatus::parse(&row.status),
            items: row.items.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct DeliveryRow {
    delivery_number: String,
    po_number: String,
    vendor_name: String,
    delivery_date: NaiveDate,
    items: Json<Vec<DeliveryItem>>,
    status: String,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            delivery_number: row.delivery_number,
            po_number: row.po_number,
            vendor_name: row.vendor_name,
            delivery_date: row.delivery_date,
            items: row.items.0,
            status: row.status,
        }
    }
}

#[derive(Debug, FromRow)]
struct StoredInvoiceRow {
    invoice_number: String,
    vendor_name: String,
    total_amount: BigDecimal,
}

impl From<StoredInvoiceRow> for StoredInvoice {
    fn from(row: StoredInvoiceRow) -> Self {
        Self {
            invoice_number: row.invoice_number,
            vendor_name: row.vendor_name,
            total_amount: row.total_amount,
        }
    }
}

/// 查询全部采购订单 (按创建顺序，保证平分时的确定性)
pub async fn list_purchase_orders(pool: &PgPool) -> Result<Vec<PurchaseOrder>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PurchaseOrderRow>(
        r#"
        SELECT po_number, vendor_name, amount, po_date, status, items
        FROM purchase_orders
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PurchaseOrder::from).collect())
}

/// 查询全部收货单
pub async fn list_deliveries(pool: &PgPool) -> Result<Vec<Delivery>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DeliveryRow>(
        r#"
        SELECT delivery_number, po_number, vendor_name, delivery_date, items, status
        FROM deliveries
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Delivery::from).collect())
}

/// 查询已入库发票 (用于重复检测)
pub async fn list_invoices(pool: &PgPool) -> Result<Vec<StoredInvoice>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoredInvoiceRow>(
        r#"
        SELECT invoice_number, vendor_name, total_amount
        FROM invoices
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(StoredInvoice::from).collect())
}

/// 一次性加载匹配快照
pub async fn load_snapshot(pool: &PgPool) -> Result<MatchSnapshot, sqlx::Error> {
    let start_time = std::time::Instant::now();

    let (purchase_orders, deliveries, invoices) = tokio::try_join!(
        list_purchase_orders(pool),
        list_deliveries(pool),
        list_invoices(pool),
    )?;

    let snapshot = MatchSnapshot::new(purchase_orders, deliveries, invoices);
    tracing::debug!(
        "Snapshot loaded: {} POs, {} deliveries, {} invoices, 耗时: {:?}",
        snapshot.purchase_orders().len(),
        snapshot.delivery_count(),
        snapshot.invoices().len(),
        start_time.elapsed()
    );

    Ok(snapshot)
}

/// 保存发票及其匹配结果，返回新记录 ID
pub async fn insert_invoice(
    pool: &PgPool,
    invoice: &InvoiceCandidate,
    result: &MatchResult,
    status: InvoiceStatus,
) -> Result<i64, sqlx::Error> {
    let query = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO invoices (
            invoice_number, vendor_name, vendor, total_amount,
            invoice_date, due_date, items, ocr_confidence,
            status, matching_results, flags
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(&invoice.invoice_number)
    .bind(&invoice.vendor.name)
    .bind(Json(&invoice.vendor))
    .bind(&invoice.total_amount)
    .bind(invoice.date)
    .bind(invoice.due_date)
    .bind(Json(&invoice.items))
    .bind(invoice.ocr_confidence)
    .bind(status.as_str())
    .bind(Json(result))
    .bind(&result.flags);

    // 超时控制: 30秒
    let execute_result =
        tokio::time::timeout(std::time::Duration::from_secs(30), query.fetch_one(pool)).await;

    match execute_result {
        Ok(Ok(id)) => {
            tracing::info!(
                "Invoice {} saved: id={}, status={}",
                invoice.invoice_number,
                id,
                status.as_str()
            );
            Ok(id)
        }
        Ok(Err(e)) => {
            tracing::error!("Invoice {} insert failed: {:?}", invoice.invoice_number, e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("Invoice {} insert timed out (>30s)", invoice.invoice_number);
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}
