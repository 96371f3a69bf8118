use crate::config::MatchingConfig;
use crate::models::{DeliveryMatch, InvoiceCandidate, MatchResult, PoMatch};
use crate::service::delivery_selector::{select_best_delivery, DeliverySelection};
use crate::service::flags::{collect_flags, overall_score, MatchSignals};
use crate::service::po_selector::select_best_po;
use crate::service::source::MatchSource;
use crate::service::verification::{is_duplicate, verify_amount};

/// 三方匹配引擎 (发票 / 采购订单 / 收货单)
///
/// 无状态、无副作用，所有数据通过 [`MatchSource`] 注入，可并发调用。
/// 任何退化情况 (无 PO、无收货单、无明细、金额为 0) 都返回 "未匹配" 结果而不报错。
#[derive(Debug, Clone, Default)]
pub struct ThreeWayMatcher {
    config: MatchingConfig,
}

impl ThreeWayMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn match_invoice(&self, invoice: &InvoiceCandidate, source: &dyn MatchSource) -> MatchResult {
        let cfg = &self.config;
        let purchase_orders = source.purchase_orders();

        tracing::info!(
            "Matching invoice {} (vendor '{}') against {} POs",
            invoice.invoice_number,
            invoice.vendor.name,
            purchase_orders.len()
        );

        // 1. PO
        let po_selection = select_best_po(invoice, purchase_orders, cfg);

        // 2. 收货单 (仅在 PO 匹配时)
        let delivery_selection = match po_selection.po {
            Some(po) => {
                let deliveries = source.deliveries_for_po(&po.po_number);
                select_best_delivery(invoice, po, deliveries, cfg)
            }
            None => DeliverySelection::none(),
        };

        // 3. 金额与重复检测
        let amount_match = verify_amount(invoice, po_selection.po, cfg);
        let duplicate = is_duplicate(invoice, source.invoices());
        if duplicate {
            tracing::warn!(
                "Invoice {} from '{}' already exists",
                invoice.invoice_number,
                invoice.vendor.name
            );
        }

        // 4. 汇总
        let signals = MatchSignals {
            po_matched: po_selection.po.is_some(),
            po_confidence: po_selection.confidence,
            delivery_matched: delivery_selection.delivery.is_some(),
            delivery_confidence: delivery_selection.confidence,
            amount: &amount_match,
            duplicate,
            item_matches: &delivery_selection.item_matches,
        };
        let flags = collect_flags(&signals, cfg);
        let score = overall_score(&signals);

        let po_match = match po_selection.po {
            Some(po) => PoMatch {
                matched: true,
                confidence: po_selection.confidence,
                po_number: Some(po.po_number.clone()),
            },
            None => PoMatch::default(),
        };
        let delivery_match = match delivery_selection.delivery {
            Some(delivery) => DeliveryMatch {
                matched: true,
                confidence: delivery_selection.confidence,
                delivery_number: Some(delivery.delivery_number.clone()),
            },
            None => DeliveryMatch::default(),
        };

        tracing::info!(
            "Invoice {} matched: PO {:?} ({:.2}), delivery {:?} ({:.2}), amount {}, score {:.2}, {} flags",
            invoice.invoice_number,
            po_match.po_number,
            po_match.confidence,
            delivery_match.delivery_number,
            delivery_match.confidence,
            amount_match.matched,
            score,
            flags.len()
        );

        MatchResult {
            po_match,
            delivery_match,
            amount_match,
            item_matches: delivery_selection.item_matches,
            flags,
            overall_score: score,
        }
    }
}
