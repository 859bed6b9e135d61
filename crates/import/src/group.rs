use std::collections::BTreeMap;

use releve_core::TransactionRow;

/// Rows sharing one grouping key, keyed in ascending order.
pub type Groups = BTreeMap<String, Vec<TransactionRow>>;

/// Stable partition by `row.key`. Keys are compared exactly: case and
/// whitespace are significant and the empty string is a key like any other.
pub fn group_rows(rows: Vec<TransactionRow>) -> Groups {
    let mut groups = Groups::new();
    for row in rows {
        groups.entry(row.key.clone()).or_default().push(row);
    }
    groups
}
