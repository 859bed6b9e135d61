pub mod aggregate;
pub mod date;
pub mod group;
pub mod loader;
pub mod rows;
pub mod table;

pub use aggregate::{summarize, GroupSummary};
pub use date::{normalize, normalize_text, DateStrategy, STRATEGIES};
pub use group::{group_rows, Groups};
pub use loader::{load_table, validate_columns, LoadError};
pub use rows::{coerce_money, map_rows};
pub use table::{Cell, Table};
