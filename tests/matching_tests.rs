//! Three-way matching tests over in-memory snapshots.

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use invoice_match_rust::models::{
    AmountMatch, Delivery, DeliveryItem, InvoiceCandidate, InvoiceItem, MatchedLine, PoItem,
    PoStatus, PurchaseOrder, StoredInvoice, Vendor,
};
use invoice_match_rust::service::flags::{
    AMOUNT_MISMATCH_FLAG, DUPLICATE_FLAG, NO_DELIVERY_FLAG, NO_PO_FLAG,
};
use invoice_match_rust::{MatchSnapshot, MatchingConfig, ThreeWayMatcher};
use std::str::FromStr;

// ============================================================================
// Fixtures
// ============================================================================

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn acme_invoice() -> InvoiceCandidate {
    InvoiceCandidate {
        invoice_number: "INV-2024-001".to_string(),
        vendor: Vendor::named("Acme Corporation"),
        total_amount: dec("25000"),
        date: date(25),
        due_date: Some(date(31)),
        items: vec![InvoiceItem {
            name: "Widget A".to_string(),
            unit_price: dec("250"),
            quantity: dec("100"),
            line_total: dec("25000"),
        }],
        ocr_confidence: 0.95,
    }
}

fn acme_po(po_number: &str, amount: &str) -> PurchaseOrder {
    PurchaseOrder {
        po_number: po_number.to_string(),
        vendor_name: "Acme Corporation".to_string(),
        amount: dec(amount),
        date: date(2),
        status: PoStatus::Active,
        items: vec![PoItem {
            description: "Widget A".to_string(),
            quantity: dec("100"),
            unit_price: dec("250"),
        }],
    }
}

fn delivery(number: &str, po_number: &str, description: &str, delivered: &str) -> Delivery {
    Delivery {
        delivery_number: number.to_string(),
        po_number: po_number.to_string(),
        vendor_name: "Acme Corporation".to_string(),
        delivery_date: date(20),
        items: vec![DeliveryItem {
            description: description.to_string(),
            quantity_ordered: dec("100"),
            quantity_delivered: dec(delivered),
        }],
        status: "received".to_string(),
    }
}

fn stored(number: &str, vendor: &str) -> StoredInvoice {
    StoredInvoice {
        invoice_number: number.to_string(),
        vendor_name: vendor.to_string(),
        total_amount: dec("25000"),
    }
}

fn matcher() -> ThreeWayMatcher {
    ThreeWayMatcher::new(MatchingConfig::default())
}

// ============================================================================
// No-match paths
// ============================================================================

mod empty_inputs {
    use super::*;

    #[test]
    fn empty_snapshot_yields_all_no_match() {
        let mut invoice = acme_invoice();
        invoice.items.clear();

        let result = matcher().match_invoice(&invoice, &MatchSnapshot::default());

        assert!(!result.po_match.matched);
        assert_eq!(result.po_match.confidence, 0.0);
        assert!(result.po_match.po_number.is_none());
        assert!(!result.delivery_match.matched);
        assert_eq!(result.delivery_match.confidence, 0.0);
        assert!(!result.amount_match.matched);
        assert_eq!(result.amount_match.variance, BigDecimal::zero());
        assert!(result.item_matches.is_empty());
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(
            result.flags,
            vec![
                NO_PO_FLAG.to_string(),
                NO_DELIVERY_FLAG.to_string(),
                "PO match confidence below perfect: 0%".to_string(),
                "Delivery match confidence below perfect: 0%".to_string(),
                AMOUNT_MISMATCH_FLAG.to_string(),
            ]
        );
    }

    #[test]
    fn po_without_deliveries_still_matches_po() {
        let snapshot = MatchSnapshot::new(vec![acme_po("PO-1", "25000")], Vec::new(), Vec::new());
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        assert!(result.po_match.matched);
        assert!(!result.delivery_match.matched);
        assert!(result.amount_match.matched);
        assert!((result.overall_score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            result.flags,
            vec![
                NO_DELIVERY_FLAG.to_string(),
                "Delivery match confidence below perfect: 0%".to_string(),
            ]
        );
    }
}

// ============================================================================
// Acme scenarios
// ============================================================================

mod acme_scenarios {
    use super::*;

    #[test]
    fn perfect_three_way_match() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "25000")],
            vec![delivery("GR-1", "PO-1", "Widget A", "100")],
            Vec::new(),
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        assert!(result.po_match.matched);
        assert_eq!(result.po_match.confidence, 1.0);
        assert_eq!(result.po_match.po_number.as_deref(), Some("PO-1"));
        assert!(result.delivery_match.matched);
        assert_eq!(result.delivery_match.confidence, 1.0);
        assert_eq!(result.delivery_match.delivery_number.as_deref(), Some("GR-1"));
        assert!(result.amount_match.matched);
        assert_eq!(result.amount_match.variance, BigDecimal::zero());
        assert_eq!(result.item_matches.len(), 1);
        assert!(matches!(
            result.item_matches[0].counterpart,
            MatchedLine::DeliveryItem(_)
        ));
        assert!(result.flags.is_empty());
        assert_eq!(result.overall_score, 1.0);
    }

    #[test]
    fn ten_percent_over_keeps_full_amount_score() {
        let snapshot = MatchSnapshot::new(vec![acme_po("PO-1", "27500")], Vec::new(), Vec::new());
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        // 2500 / 27500 落在 0.1 容差内，金额得分仍为 1
        assert_eq!(result.po_match.confidence, 1.0);
        // 但超出 5% 的金额核对容差
        assert!(!result.amount_match.matched);
        assert_eq!(result.amount_match.variance, dec("2500"));
        assert_eq!(
            result.flags,
            vec![
                NO_DELIVERY_FLAG.to_string(),
                "Amount exceeds PO by ₹2,500".to_string(),
                "Delivery match confidence below perfect: 0%".to_string(),
                AMOUNT_MISMATCH_FLAG.to_string(),
            ]
        );
        assert!((result.overall_score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn exact_ten_percent_ratio_is_inclusive() {
        let mut invoice = acme_invoice();
        invoice.total_amount = dec("27500");
        let snapshot = MatchSnapshot::new(vec![acme_po("PO-1", "25000")], Vec::new(), Vec::new());

        let result = matcher().match_invoice(&invoice, &snapshot);
        assert_eq!(result.po_match.confidence, 1.0);
    }

    #[test]
    fn twenty_percent_over_reduces_confidence_exactly() {
        let snapshot = MatchSnapshot::new(vec![acme_po("PO-1", "30000")], Vec::new(), Vec::new());
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        // 0.4 * 1 + 0.3 * (1 - 5000/30000) + 0.3 * 1
        let expected = 0.4 + 0.3 * (1.0 - 5000.0 / 30000.0) + 0.3;
        assert!(result.po_match.matched);
        assert!((result.po_match.confidence - expected).abs() < 1e-9);
        assert!((result.po_match.confidence - 0.95).abs() < 1e-9);
        assert!(result.flags.contains(&"Amount exceeds PO by ₹5,000".to_string()));
        assert!(result
            .flags
            .contains(&"PO match confidence below perfect: 95%".to_string()));
        assert!(!result.flags.iter().any(|f| f == "Low confidence PO match"));
    }

    #[test]
    fn delivery_description_drift_is_flagged_per_item() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "25000")],
            vec![delivery("GR-1", "PO-1", "Widget A XY", "100")],
            Vec::new(),
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        // 相似度 1 - 3/11
        let sim = 1.0 - 3.0 / 11.0;
        assert!(result.delivery_match.matched);
        assert!((result.delivery_match.confidence - (0.5 + 0.5 * sim)).abs() < 1e-12);
        assert_eq!(
            result.flags,
            vec![
                "Item 1: Low description similarity (72.73%)".to_string(),
                "Delivery match confidence below perfect: 86%".to_string(),
            ]
        );
    }
}

// ============================================================================
// Selection rules
// ============================================================================

mod selection {
    use super::*;

    #[test]
    fn deliveries_join_on_po_number_only() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "25000"), acme_po("PO-2", "90000")],
            vec![delivery("GR-9", "PO-2", "Widget A", "100")],
            Vec::new(),
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        assert_eq!(result.po_match.po_number.as_deref(), Some("PO-1"));
        assert!(!result.delivery_match.matched);
    }

    #[test]
    fn equal_pos_resolve_to_first_in_source_order() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-A", "25000"), acme_po("PO-B", "25000")],
            vec![
                delivery("GR-B", "PO-B", "Widget A", "100"),
                delivery("GR-A", "PO-A", "Widget A", "100"),
            ],
            Vec::new(),
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        assert_eq!(result.po_match.po_number.as_deref(), Some("PO-A"));
        assert_eq!(result.delivery_match.delivery_number.as_deref(), Some("GR-A"));
    }

    #[test]
    fn thresholds_are_configurable() {
        let cfg = MatchingConfig {
            po_confidence_threshold: 0.96,
            ..MatchingConfig::default()
        };
        let snapshot = MatchSnapshot::new(vec![acme_po("PO-1", "30000")], Vec::new(), Vec::new());
        let result = ThreeWayMatcher::new(cfg).match_invoice(&acme_invoice(), &snapshot);

        assert!(!result.po_match.matched);
        assert_eq!(result.flags[0], NO_PO_FLAG);
    }
}

// ============================================================================
// Duplicates, determinism, serialization
// ============================================================================

mod result_properties {
    use super::*;

    #[test]
    fn duplicate_invoice_is_flagged() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "25000")],
            vec![delivery("GR-1", "PO-1", "Widget A", "100")],
            vec![stored("INV-2024-001", "ACME CORPORATION")],
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);

        assert_eq!(result.flags, vec![DUPLICATE_FLAG.to_string()]);
        // 重复检测不影响评分
        assert_eq!(result.overall_score, 1.0);
    }

    #[test]
    fn matching_is_idempotent() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "30000"), acme_po("PO-2", "25000")],
            vec![
                delivery("GR-1", "PO-2", "Widget A XY", "99"),
                delivery("GR-2", "PO-2", "Widget A", "97"),
            ],
            vec![stored("INV-2024-001", "Acme Corporation")],
        );
        let engine = matcher();

        let first = engine.match_invoice(&acme_invoice(), &snapshot);
        let second = engine.match_invoice(&acme_invoice(), &snapshot);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let amounts = ["0", "1", "12500", "25000", "27500", "30000", "250000"];
        let engine = matcher();

        for amount in amounts {
            let snapshot = MatchSnapshot::new(
                vec![acme_po("PO-1", amount)],
                vec![delivery("GR-1", "PO-1", "Widget A", "101")],
                Vec::new(),
            );
            let result = engine.match_invoice(&acme_invoice(), &snapshot);

            for score in [
                result.overall_score,
                result.po_match.confidence,
                result.delivery_match.confidence,
            ] {
                assert!((0.0..=1.0).contains(&score), "score {} out of range for {}", score, amount);
            }
            assert!(result.item_matches.len() <= acme_invoice().items.len());
        }
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let snapshot = MatchSnapshot::new(
            vec![acme_po("PO-1", "25000")],
            vec![delivery("GR-1", "PO-1", "Widget A", "100")],
            Vec::new(),
        );
        let result = matcher().match_invoice(&acme_invoice(), &snapshot);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["poMatch"]["poNumber"], "PO-1");
        assert_eq!(json["deliveryMatch"]["deliveryNumber"], "GR-1");
        assert_eq!(json["amountMatch"]["matched"], true);
        assert_eq!(json["overallScore"], 1.0);
        let item = &json["itemMatches"][0];
        assert_eq!(item["invoiceItem"]["name"], "Widget A");
        assert_eq!(item["deliveryItem"]["description"], "Widget A");
        assert_eq!(item["quantityMatch"], true);
        assert_eq!(item["priceMatch"], false);

        let empty = matcher().match_invoice(&acme_invoice(), &MatchSnapshot::default());
        let json = serde_json::to_value(&empty).unwrap();
        assert!(json["poMatch"].get("poNumber").is_none());
    }

    #[test]
    fn amount_variance_serializes_as_number() {
        let exact = MatchSnapshot::new(vec![acme_po("PO-1", "25000")], Vec::new(), Vec::new());
        let json = serde_json::to_value(matcher().match_invoice(&acme_invoice(), &exact)).unwrap();
        assert!(json["amountMatch"]["variance"].is_number());
        assert_eq!(json["amountMatch"]["variance"], 0.0);

        let over = MatchSnapshot::new(vec![acme_po("PO-1", "27500")], Vec::new(), Vec::new());
        let result = matcher().match_invoice(&acme_invoice(), &over);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["amountMatch"], serde_json::json!({"matched": false, "variance": 2500.0}));

        let parsed: AmountMatch = serde_json::from_value(json["amountMatch"].clone()).unwrap();
        assert_eq!(parsed, result.amount_match);
    }
}
