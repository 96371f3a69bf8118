use crate::config::MatchingConfig;
use crate::models::{AmountMatch, ItemMatch};
use bigdecimal::BigDecimal;

pub const NO_PO_FLAG: &str = "No matching Purchase Order found";
pub const LOW_PO_CONFIDENCE_FLAG: &str = "Low confidence PO match";
pub const NO_DELIVERY_FLAG: &str = "No delivery record found";
pub const DUPLICATE_FLAG: &str = "Potential duplicate invoice detected";
pub const NO_DELIVERY_ITEMS_FLAG: &str = "No matching delivery items found";
pub const AMOUNT_MISMATCH_FLAG: &str = "Amount does not exactly match PO";

/// 汇总打标所需的全部匹配信号
#[derive(Debug, Clone, Copy)]
pub struct MatchSignals<'a> {
    pub po_matched: bool,
    pub po_confidence: f64,
    pub delivery_matched: bool,
    pub delivery_confidence: f64,
    pub amount: &'a AmountMatch,
    pub duplicate: bool,
    pub item_matches: &'a [ItemMatch],
}

/// 按固定顺序生成标记 (调用方会原样展示，顺序不可调整)
pub fn collect_flags(signals: &MatchSignals<'_>, cfg: &MatchingConfig) -> Vec<String> {
    let mut flags = Vec::new();

    if !signals.po_matched {
        flags.push(NO_PO_FLAG.to_string());
    } else if signals.po_confidence < cfg.low_po_confidence {
        flags.push(LOW_PO_CONFIDENCE_FLAG.to_string());
    }

    if !signals.delivery_matched {
        flags.push(NO_DELIVERY_FLAG.to_string());
    }

    if signals.po_matched && !signals.amount.matched {
        flags.push(format!(
            "Amount exceeds PO by {}",
            format_currency(&cfg.currency_symbol, &signals.amount.variance)
        ));
    }

    if signals.duplicate {
        flags.push(DUPLICATE_FLAG.to_string());
    }

    for (idx, m) in signals.item_matches.iter().enumerate() {
        if m.description_similarity < cfg.low_description_similarity {
            flags.push(format!(
                "Item {}: Low description similarity ({:.2}%)",
                idx + 1,
                m.description_similarity * 100.0
            ));
        }
        if !m.quantity_match {
            flags.push(format!("Item {}: Quantity mismatch", idx + 1));
        }
    }

    if signals.delivery_matched && signals.item_matches.is_empty() {
        flags.push(NO_DELIVERY_ITEMS_FLAG.to_string());
    }

    // 严格比较 1.0: 任何非满分都会打标
    if signals.po_confidence < 1.0 {
        flags.push(format!(
            "PO match confidence below perfect: {}%",
            whole_percent(signals.po_confidence)
        ));
    }
    if signals.delivery_confidence < 1.0 {
        flags.push(format!(
            "Delivery match confidence below perfect: {}%",
            whole_percent(signals.delivery_confidence)
        ));
    }

    if !signals.amount.matched {
        flags.push(AMOUNT_MISMATCH_FLAG.to_string());
    }

    flags
}

/// 取整百分比，.5 向上进位 (`{:.0}` 会向偶数舍入，62.5 得 62)
fn whole_percent(ratio: f64) -> f64 {
    (ratio * 100.0).round()
}

/// 三项等权平均: PO 置信度、收货单置信度、金额是否匹配
pub fn overall_score(signals: &MatchSignals<'_>) -> f64 {
    let amount = if signals.amount.matched { 1.0 } else { 0.0 };
    (signals.po_confidence + signals.delivery_confidence + amount) / 3.0
}

/// 货币格式: 千分位，最多三位小数并去掉末尾 0，例如 `₹1,234.5`
pub fn format_currency(symbol: &str, value: &BigDecimal) -> String {
    let rounded = value.round(3).to_string();
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (digits, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{}{}{}", sign, symbol, grouped)
    } else {
        format!("{}{}{}.{}", sign, symbol, grouped, frac_part)
    }
}
