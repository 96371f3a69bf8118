use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 收货单 (Goods Receipt)，通过 po_number 关联采购订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub delivery_number: String,
    pub po_number: String,
    pub vendor_name: String,
    pub delivery_date: NaiveDate,
    pub items: Vec<DeliveryItem>,
    pub status: String,
}

/// 收货明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItem {
    pub description: String,
    pub quantity_ordered: BigDecimal,
    pub quantity_delivered: BigDecimal,
}
