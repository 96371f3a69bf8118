use crate::db::queries;
use crate::error::AppError;
use crate::models::{InvoiceCandidate, InvoiceStatus, MatchResult, OcrInvoice};
use crate::service::ThreeWayMatcher;
use chrono::{Local, NaiveDate};
use dashmap::DashMap;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// 已提交发票
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedInvoice {
    pub id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub matching_results: MatchResult,
}

/// 发票接收服务: 规范化 OCR 数据 -> 加载快照 -> 三方匹配 -> 审批判定 -> 入库
pub struct InvoiceMatchService {
    pool: PgPool,
    matcher: ThreeWayMatcher,
    auto_approve: bool,
    /// 同一 (发票号, 供应商) 的提交串行执行，避免并发提交时互相漏检重复
    submissions: SubmissionLocks,
}

impl InvoiceMatchService {
    pub fn new(pool: PgPool, matcher: ThreeWayMatcher, auto_approve: bool) -> Self {
        Self {
            pool,
            matcher,
            auto_approve,
            submissions: SubmissionLocks::default(),
        }
    }

    /// 仅匹配，不入库
    pub async fn preview(&self, payload: OcrInvoice) -> Result<MatchResult, AppError> {
        let invoice = payload.normalize(today())?;
        let snapshot = queries::load_snapshot(&self.pool).await?;
        Ok(self.matcher.match_invoice(&invoice, &snapshot))
    }

    /// 匹配并保存发票
    pub async fn submit(&self, payload: OcrInvoice) -> Result<SubmittedInvoice, AppError> {
        let invoice = payload.normalize(today())?;

        // 请求被取消时 permit 随 future 一起 drop，锁表条目同样会被回收
        let _permit = self.submissions.acquire(submission_key(&invoice)).await;
        debug!(
            "Submission lock held for {} ({} keys in flight)",
            invoice.invoice_number,
            self.submissions.len()
        );

        self.match_and_store(invoice).await
    }

    /// 正在提交或排队中的键数量
    pub fn pending_submissions(&self) -> usize {
        self.submissions.len()
    }

    async fn match_and_store(&self, invoice: InvoiceCandidate) -> Result<SubmittedInvoice, AppError> {
        let snapshot = queries::load_snapshot(&self.pool).await?;
        let result = self.matcher.match_invoice(&invoice, &snapshot);
        let status = InvoiceStatus::for_match(&result, self.auto_approve);

        let id = queries::insert_invoice(&self.pool, &invoice, &result, status).await?;
        if status == InvoiceStatus::Approved {
            tracing::info!("Invoice {} auto-approved", invoice.invoice_number);
        }

        Ok(SubmittedInvoice {
            id,
            invoice_number: invoice.invoice_number,
            status,
            matching_results: result,
        })
    }
}

/// 按键串行化的锁表，最后一个持有者离开时移除条目
#[derive(Default)]
pub struct SubmissionLocks {
    slots: DashMap<String, SubmissionSlot>,
}

#[derive(Default)]
struct SubmissionSlot {
    lock: Arc<Mutex<()>>,
    /// 持有或等待该锁的提交数，只在分片锁内修改
    users: usize,
}

impl SubmissionLocks {
    pub async fn acquire(&self, key: String) -> SubmissionPermit<'_> {
        let lock = {
            let mut slot = self.slots.entry(key.clone()).or_default();
            slot.users += 1;
            Arc::clone(&slot.lock)
        };

        // 先登记 permit 再等待: 等待中被取消也会走 Drop 归还计数
        let mut permit = SubmissionPermit {
            locks: self,
            key,
            guard: None,
        };
        permit.guard = Some(lock.lock_owned().await);
        permit
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// 持有期间同键的其他提交排队
pub struct SubmissionPermit<'a> {
    locks: &'a SubmissionLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.slots.remove_if_mut(&self.key, |_, slot| {
            slot.users -= 1;
            slot.users == 0
        });
    }
}

/// 提交锁的键: 发票号 + 小写供应商名 (与重复检测口径一致)
pub fn submission_key(invoice: &InvoiceCandidate) -> String {
    format!(
        "{}\u{1f}{}",
        invoice.invoice_number,
        invoice.vendor.name.to_lowercase()
    )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
