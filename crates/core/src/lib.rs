pub mod money;
pub mod period;
pub mod timestamp;
pub mod transaction;
pub mod variant;

pub use money::Money;
pub use period::{Period, PERIOD_DATE_FORMAT};
pub use timestamp::{Timestamp, INVALID_DATE_MARKER, MISSING_DATE_MARKER};
pub use transaction::{sort_chronologically, TransactionRow};
pub use variant::{ColumnSpec, InfoLine, InfoValue, ReportVariant, RowField, VariantError, VariantKind};
