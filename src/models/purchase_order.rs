use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 采购订单 (PurchaseOrder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub po_number: String,
    pub vendor_name: String,
    pub amount: BigDecimal,
    pub date: NaiveDate,
    pub status: PoStatus,
    pub items: Vec<PoItem>,
}

/// 采购订单明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoItem {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    Active,
    Completed,
    Cancelled,
}

impl PoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Active => "active",
            PoStatus::Completed => "completed",
            PoStatus::Cancelled => "cancelled",
        }
    }

    /// 数据库中的未知状态按 active 处理
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => PoStatus::Completed,
            "cancelled" | "canceled" => PoStatus::Cancelled,
            "active" => PoStatus::Active,
            other => {
                tracing::warn!("Unknown PO status '{}', treating as active", other);
                PoStatus::Active
            }
        }
    }
}
