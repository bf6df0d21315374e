//! Two-column row layout.

/// Indent before the left column.
const PAD: usize = 2;
/// Space between the columns.
const GAP: usize = 2;

/// One help row: a name on the left, a description on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    pub left: String,
    pub right: String,
}

impl Row {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Lays out rows with the right column aligned across all of them.
///
/// Rows without a right-hand side carry no trailing padding.
pub(crate) fn format_rows(rows: &[Row]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|row| row.left.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            if row.right.is_empty() {
                format!("{:PAD$}{}", "", row.left)
            } else {
                format!(
                    "{:PAD$}{:<width$}{:GAP$}{}",
                    "", row.left, "", row.right
                )
            }
        })
        .collect()
}
