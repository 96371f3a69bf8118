use crate::models::{DeliveryItem, InvoiceItem, PoItem};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{ser, Deserialize, Serialize, Serializer};

/// 三方匹配结果，由调用方随发票一起保存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub po_match: PoMatch,
    pub delivery_match: DeliveryMatch,
    pub amount_match: AmountMatch,
    pub item_matches: Vec<ItemMatch>,
    pub flags: Vec<String>,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoMatch {
    pub matched: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMatch {
    pub matched: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_number: Option<String>,
}

/// variance 为绝对差额，JSON 中输出为数字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountMatch {
    pub matched: bool,
    #[serde(serialize_with = "decimal_as_number")]
    pub variance: BigDecimal,
}

impl AmountMatch {
    pub fn unmatched() -> Self {
        Self {
            matched: false,
            variance: BigDecimal::zero(),
        }
    }
}

fn decimal_as_number<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    let number = value
        .to_f64()
        .ok_or_else(|| ser::Error::custom(format!("amount {} out of f64 range", value)))?;
    serializer.serialize_f64(number)
}

/// 单个发票明细的最佳匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMatch {
    pub invoice_item: InvoiceItem,
    #[serde(flatten)]
    pub counterpart: MatchedLine,
    pub description_similarity: f64,
    pub quantity_match: bool,
    pub price_match: bool,
}

/// 匹配到的对方明细: PO 明细或收货明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchedLine {
    PoItem(PoItem),
    DeliveryItem(DeliveryItem),
}
