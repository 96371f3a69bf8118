pub mod delivery;
pub mod invoice;
pub mod purchase_order;
pub mod result;

pub use delivery::{Delivery, DeliveryItem};
pub use invoice::{
    InvoiceCandidate, InvoiceItem, InvoiceStatus, OcrInvoice, OcrItem, OcrVendor, StoredInvoice,
    Vendor,
};
pub use purchase_order::{PoItem, PoStatus, PurchaseOrder};
pub use result::{AmountMatch, DeliveryMatch, ItemMatch, MatchResult, MatchedLine, PoMatch};
