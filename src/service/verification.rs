use crate::config::MatchingConfig;
use crate::models::{AmountMatch, InvoiceCandidate, PurchaseOrder, StoredInvoice};
use crate::service::decimal::{abs_diff, relative_variance};

/// 金额核对: 差额占 PO 金额的比例在容差内 (含边界) 即匹配；未匹配 PO 时返回未匹配、差额 0
pub fn verify_amount(
    invoice: &InvoiceCandidate,
    po: Option<&PurchaseOrder>,
    cfg: &MatchingConfig,
) -> AmountMatch {
    let Some(po) = po else {
        return AmountMatch::unmatched();
    };

    let matched = relative_variance(&invoice.total_amount, &po.amount)
        .map_or(false, |v| v <= cfg.amount_tolerance);

    AmountMatch {
        matched,
        variance: abs_diff(&po.amount, &invoice.total_amount),
    }
}

/// 发票号完全一致且供应商名称忽略大小写一致即视为重复
pub fn is_duplicate(invoice: &InvoiceCandidate, existing: &[StoredInvoice]) -> bool {
    let vendor = invoice.vendor.name.to_lowercase();
    existing.iter().any(|stored| {
        stored.invoice_number == invoice.invoice_number
            && stored.vendor_name.to_lowercase() == vendor
    })
}
