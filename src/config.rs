use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// 满分匹配时自动审批
    pub auto_approve: bool,
}

/// 匹配阈值、权重与容差。默认值即业务基线，调整时不改动匹配逻辑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// PO 置信度需严格大于该值才算匹配
    pub po_confidence_threshold: f64,
    /// 收货单置信度需严格大于该值才算匹配
    pub delivery_confidence_threshold: f64,
    /// 低于该值时提示 "Low confidence PO match"
    pub low_po_confidence: f64,
    /// 金额核对容差 (相对 PO 金额)
    pub amount_tolerance: f64,
    /// PO 评分中金额满分的容差
    pub amount_score_tolerance: f64,
    /// 明细单价容差 (相对 PO 单价)
    pub price_tolerance: f64,
    /// 明细描述相似度下限
    pub description_similarity_floor: f64,
    /// 低于该相似度时对明细打标
    pub low_description_similarity: f64,
    /// 收货数量允许偏差 (件)
    pub quantity_tolerance: f64,
    pub po_vendor_weight: f64,
    pub po_amount_weight: f64,
    pub po_item_weight: f64,
    pub delivery_vendor_weight: f64,
    pub delivery_item_weight: f64,
    /// 未满足条件的明细按该系数折算
    pub partial_item_factor: f64,
    pub currency_symbol: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            po_confidence_threshold: 0.7,
            delivery_confidence_threshold: 0.6,
            low_po_confidence: 0.9,
            amount_tolerance: 0.05,
            amount_score_tolerance: 0.1,
            price_tolerance: 0.05,
            description_similarity_floor: 0.7,
            low_description_similarity: 0.8,
            quantity_tolerance: 1.0,
            po_vendor_weight: 0.4,
            po_amount_weight: 0.3,
            po_item_weight: 0.3,
            delivery_vendor_weight: 0.5,
            delivery_item_weight: 0.5,
            partial_item_factor: 0.5,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/invoice_match".to_string(),
                max_connections: 20,
            },
            matching: MatchingConfig::default(),
            approval: ApprovalConfig::default(),
        }
    }
}

impl AppConfig {
    /// 分层加载: 默认值 -> config/invoice-match.* -> APP__* 环境变量 -> 兼容旧环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .add_source(File::with_name("config/invoice-match").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()?
            .try_deserialize()
    }
}
