pub mod decimal;
pub mod delivery_selector;
pub mod flags;
pub mod intake;
pub mod item_matcher;
pub mod matcher;
pub mod po_selector;
pub mod similarity;
pub mod source;
pub mod verification;

pub use intake::{InvoiceMatchService, SubmittedInvoice};
pub use matcher::ThreeWayMatcher;
pub use similarity::similarity;
pub use source::{MatchSnapshot, MatchSource};
