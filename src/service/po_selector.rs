use crate::config::MatchingConfig;
use crate::models::{InvoiceCandidate, PurchaseOrder};
use crate::service::decimal::relative_variance;
use crate::service::item_matcher::{item_score, match_items_to_po};
use crate::service::similarity::similarity;
use rayon::prelude::*;

/// PO 选择结果，未匹配时 po 为 None 且 confidence 为 0
#[derive(Debug, Clone, Copy)]
pub struct PoSelection<'a> {
    pub po: Option<&'a PurchaseOrder>,
    pub confidence: f64,
}

impl PoSelection<'_> {
    pub fn none() -> Self {
        Self {
            po: None,
            confidence: 0.0,
        }
    }
}

/// 对所有 PO 评分并选出最佳
///
/// 评分并行进行，选择按来源顺序串行折叠: 置信度需超过阈值且严格高于当前最佳，
/// 平分时保留先出现的 PO。
pub fn select_best_po<'a>(
    invoice: &InvoiceCandidate,
    purchase_orders: &'a [PurchaseOrder],
    cfg: &MatchingConfig,
) -> PoSelection<'a> {
    let scores: Vec<f64> = purchase_orders
        .par_iter()
        .map(|po| po_confidence(invoice, po, cfg))
        .collect();

    let mut best = PoSelection::none();
    for (po, confidence) in purchase_orders.iter().zip(scores) {
        tracing::debug!("PO {} confidence {:.4}", po.po_number, confidence);
        if confidence > best.confidence && confidence > cfg.po_confidence_threshold {
            best = PoSelection {
                po: Some(po),
                confidence,
            };
        }
    }

    best
}

/// confidence = w_vendor * 供应商相似度 + w_amount * 金额得分 + w_item * 明细得分
pub fn po_confidence(invoice: &InvoiceCandidate, po: &PurchaseOrder, cfg: &MatchingConfig) -> f64 {
    let vendor = similarity(&invoice.vendor.name, &po.vendor_name);
    let amount = amount_score(invoice, po, cfg);

    let item_matches = match_items_to_po(&invoice.items, &po.items, cfg);
    let items = item_score(&item_matches, |m| m.price_match, cfg);

    cfg.po_vendor_weight * vendor + cfg.po_amount_weight * amount + cfg.po_item_weight * items
}

/// 偏差在容差内 (含边界) 记满分，否则 max(0, 1 - 偏差)；PO 金额为 0 记 0 分
pub fn amount_score(invoice: &InvoiceCandidate, po: &PurchaseOrder, cfg: &MatchingConfig) -> f64 {
    match relative_variance(&invoice.total_amount, &po.amount) {
        Some(variance) if variance <= cfg.amount_score_tolerance => 1.0,
        Some(variance) => (1.0 - variance).max(0.0),
        None => 0.0,
    }
}
