use crate::models::{Delivery, PurchaseOrder, StoredInvoice};
use indexmap::IndexMap;

/// 匹配引擎的只读数据来源。迭代顺序必须稳定 (平分时先出现者胜出)
pub trait MatchSource {
    fn purchase_orders(&self) -> &[PurchaseOrder];

    /// 按 po_number 关联的收货单
    fn deliveries_for_po(&self, po_number: &str) -> &[Delivery];

    fn invoices(&self) -> &[StoredInvoice];
}

/// 内存快照: 一次匹配请求所需的全部数据
#[derive(Debug, Clone, Default)]
pub struct MatchSnapshot {
    purchase_orders: Vec<PurchaseOrder>,
    deliveries_by_po: IndexMap<String, Vec<Delivery>>,
    invoices: Vec<StoredInvoice>,
}

impl MatchSnapshot {
    pub fn new(
        purchase_orders: Vec<PurchaseOrder>,
        deliveries: Vec<Delivery>,
        invoices: Vec<StoredInvoice>,
    ) -> Self {
        let mut deliveries_by_po: IndexMap<String, Vec<Delivery>> = IndexMap::new();
        for delivery in deliveries {
            deliveries_by_po
                .entry(delivery.po_number.clone())
                .or_default()
                .push(delivery);
        }

        Self {
            purchase_orders,
            deliveries_by_po,
            invoices,
        }
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries_by_po.values().map(Vec::len).sum()
    }
}

impl MatchSource for MatchSnapshot {
    fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    fn deliveries_for_po(&self, po_number: &str) -> &[Delivery] {
        self.deliveries_by_po
            .get(po_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn invoices(&self) -> &[StoredInvoice] {
        &self.invoices
    }
}
