use crate::config::MatchingConfig;
use crate::models::{DeliveryItem, InvoiceItem, ItemMatch, MatchedLine, PoItem};
use crate::service::decimal::{abs_diff, relative_variance, to_f64};
use crate::service::similarity::similarity;

/// 发票明细 vs PO 明细
///
/// 每个发票明细贪心取最佳: 描述相似度 > 下限且单价在容差内，取相似度最高者。
/// 同一 PO 明细可被多个发票明细复用；没有合格候选的发票明细不产生记录。
pub fn match_items_to_po(
    invoice_items: &[InvoiceItem],
    po_items: &[PoItem],
    cfg: &MatchingConfig,
) -> Vec<ItemMatch> {
    invoice_items
        .iter()
        .filter_map(|invoice_item| {
            let mut best: Option<(f64, &PoItem)> = None;

            for po_item in po_items {
                let sim = similarity(&invoice_item.name, &po_item.description);
                if sim <= cfg.description_similarity_floor {
                    continue;
                }
                if !price_matches(invoice_item, po_item, cfg) {
                    continue;
                }
                if best.map_or(true, |(best_sim, _)| sim > best_sim) {
                    best = Some((sim, po_item));
                }
            }

            best.map(|(sim, po_item)| ItemMatch {
                invoice_item: invoice_item.clone(),
                counterpart: MatchedLine::PoItem(po_item.clone()),
                description_similarity: sim,
                quantity_match: false,
                price_match: true,
            })
        })
        .collect()
}

/// 发票明细 vs 收货明细
///
/// 相似度低于下限的收货明细直接跳过；其余候选中只有数量偏差在容差内的才能胜出。
/// 单价不在此核对，price_match 恒为 false。`_po_items` 保留以对齐三方参数。
pub fn match_items_to_delivery(
    invoice_items: &[InvoiceItem],
    _po_items: &[PoItem],
    delivery_items: &[DeliveryItem],
    cfg: &MatchingConfig,
) -> Vec<ItemMatch> {
    invoice_items
        .iter()
        .filter_map(|invoice_item| {
            let mut best: Option<(f64, &DeliveryItem)> = None;

            for delivery_item in delivery_items {
                let sim = similarity(&invoice_item.name, &delivery_item.description);
                if sim < cfg.description_similarity_floor {
                    continue;
                }
                if !quantity_matches(invoice_item, delivery_item, cfg) {
                    continue;
                }
                if best.map_or(true, |(best_sim, _)| sim > best_sim) {
                    best = Some((sim, delivery_item));
                }
            }

            best.map(|(sim, delivery_item)| ItemMatch {
                invoice_item: invoice_item.clone(),
                counterpart: MatchedLine::DeliveryItem(delivery_item.clone()),
                description_similarity: sim,
                quantity_match: true,
                price_match: false,
            })
        })
        .collect()
}

/// PO 单价为 0 视为不匹配
pub fn price_matches(invoice_item: &InvoiceItem, po_item: &PoItem, cfg: &MatchingConfig) -> bool {
    relative_variance(&invoice_item.unit_price, &po_item.unit_price)
        .map_or(false, |v| v <= cfg.price_tolerance)
}

pub fn quantity_matches(
    invoice_item: &InvoiceItem,
    delivery_item: &DeliveryItem,
    cfg: &MatchingConfig,
) -> bool {
    let diff = abs_diff(&delivery_item.quantity_delivered, &invoice_item.quantity);
    to_f64(&diff) <= cfg.quantity_tolerance
}

/// 明细得分: 相似度均值，条件未满足的按 partial_item_factor 折算；无匹配为 0
pub fn item_score<F>(matches: &[ItemMatch], satisfied: F, cfg: &MatchingConfig) -> f64
where
    F: Fn(&ItemMatch) -> bool,
{
    if matches.is_empty() {
        return 0.0;
    }
    let total: f64 = matches
        .iter()
        .map(|m| {
            let factor = if satisfied(m) { 1.0 } else { cfg.partial_item_factor };
            m.description_similarity * factor
        })
        .sum();
    total / matches.len() as f64
}
