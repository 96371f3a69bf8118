use crate::config::MatchingConfig;
use crate::models::{Delivery, InvoiceCandidate, ItemMatch, PurchaseOrder};
use crate::service::item_matcher::{item_score, match_items_to_delivery};
use crate::service::similarity::similarity;

/// 收货单选择结果，item_matches 为胜出收货单的明细匹配
#[derive(Debug, Clone)]
pub struct DeliverySelection<'a> {
    pub delivery: Option<&'a Delivery>,
    pub confidence: f64,
    pub item_matches: Vec<ItemMatch>,
}

impl DeliverySelection<'_> {
    pub fn none() -> Self {
        Self {
            delivery: None,
            confidence: 0.0,
            item_matches: Vec::new(),
        }
    }
}

/// 在已匹配 PO 的收货单中选出最佳 (阈值之上、严格最高、平分取先出现者)
pub fn select_best_delivery<'a>(
    invoice: &InvoiceCandidate,
    po: &PurchaseOrder,
    deliveries: &'a [Delivery],
    cfg: &MatchingConfig,
) -> DeliverySelection<'a> {
    let mut best = DeliverySelection::none();

    for delivery in deliveries {
        let vendor = similarity(&invoice.vendor.name, &delivery.vendor_name);
        let item_matches = match_items_to_delivery(&invoice.items, &po.items, &delivery.items, cfg);
        let items = item_score(&item_matches, |m| m.quantity_match, cfg);

        let confidence = cfg.delivery_vendor_weight * vendor + cfg.delivery_item_weight * items;
        tracing::debug!(
            "Delivery {} (PO {}) confidence {:.4}, {} item matches",
            delivery.delivery_number,
            po.po_number,
            confidence,
            item_matches.len()
        );

        if confidence > best.confidence && confidence > cfg.delivery_confidence_threshold {
            best = DeliverySelection {
                delivery: Some(delivery),
                confidence,
                item_matches,
            };
        }
    }

    best
}
