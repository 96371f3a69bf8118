use crate::error::AppError;
use crate::models::MatchResult;
use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
pub const UNKNOWN_ITEM: &str = "Unknown Item";
pub const DEFAULT_OCR_CONFIDENCE: f64 = 0.5;
const DEFAULT_DUE_DAYS: i64 = 7;

/// 待匹配发票 (已规范化，仅在单次匹配请求中存在)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCandidate {
    pub invoice_number: String,
    pub vendor: Vendor,
    pub total_amount: BigDecimal,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub ocr_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl Vendor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// 发票明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: BigDecimal,
    pub line_total: BigDecimal,
}

/// 已入库发票 (用于重复检测)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInvoice {
    pub invoice_number: String,
    pub vendor_name: String,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Rejected => "rejected",
            InvoiceStatus::Paid => "paid",
        }
    }

    /// 自动审批: 开关打开且三方匹配满分才直接通过
    pub fn for_match(result: &MatchResult, auto_approve: bool) -> Self {
        if auto_approve && result.overall_score == 1.0 {
            InvoiceStatus::Approved
        } else {
            InvoiceStatus::Pending
        }
    }
}

/// OCR 服务返回的原始发票数据，所有字段都可能缺失
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrInvoice {
    pub invoice_number: Option<String>,
    pub vendor_id: Option<OcrVendor>,
    pub total_amount: Option<BigDecimal>,
    pub date: Option<String>,
    pub due_date: Option<String>,
    #[serde(default)]
    pub items: Vec<OcrItem>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrVendor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OcrItem {
    pub iname: Option<String>,
    pub amt: Option<BigDecimal>,
    pub units: Option<BigDecimal>,
    pub t_amt: Option<BigDecimal>,
}

impl OcrInvoice {
    /// 规范化 OCR 数据，缺省值只在这里补齐一次
    pub fn normalize(self, today: NaiveDate) -> Result<InvoiceCandidate, AppError> {
        let invoice_number = non_blank(self.invoice_number)
            .ok_or_else(|| AppError::validation("invoiceNumber is required"))?;

        let vendor = match self.vendor_id {
            Some(v) => Vendor {
                name: non_blank(v.name).unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
                email: non_blank(v.email),
                phone: non_blank(v.phone),
                address: non_blank(v.address),
                tax_id: non_blank(v.tax_id),
            },
            None => Vendor::named(UNKNOWN_VENDOR),
        };

        let date = match non_blank(self.date) {
            Some(raw) => parse_date(&raw)?,
            None => today,
        };
        let due_date = match non_blank(self.due_date) {
            Some(raw) => parse_date(&raw)?,
            None => today + Duration::days(DEFAULT_DUE_DAYS),
        };

        let items = self.items.into_iter().map(OcrItem::normalize).collect();

        let ocr_confidence = match self.confidence {
            Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
            _ => DEFAULT_OCR_CONFIDENCE,
        };

        Ok(InvoiceCandidate {
            invoice_number,
            vendor,
            total_amount: self.total_amount.unwrap_or_else(BigDecimal::zero),
            date,
            due_date: Some(due_date),
            items,
            ocr_confidence,
        })
    }
}

impl OcrItem {
    fn normalize(self) -> InvoiceItem {
        let unit_price = self.amt.unwrap_or_else(BigDecimal::zero);
        let quantity = match self.units {
            Some(u) if !u.is_zero() => u,
            _ => BigDecimal::from(1),
        };
        let line_total = match self.t_amt {
            Some(t) if !t.is_zero() => t,
            _ => &unit_price * &quantity,
        };

        InvoiceItem {
            name: non_blank(self.iname).unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            unit_price,
            quantity,
            line_total,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 接受 `YYYY-MM-DD` 或以其开头的 ISO 时间戳
fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| AppError::validation(format!("invalid date '{}': {}", raw, e)))
}
