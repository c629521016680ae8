//! Left join of two tables on a shared key.

use crate::error::{EdaError, Result, ResultExt};
use crate::table::Table;
use crate::types::{ColumnKind, ColumnMeta};
use polars::prelude::*;
use tracing::info;

const ROW_ORDER: &str = "__left_row";
const RIGHT_SUFFIX: &str = "_right";

/// Left-join `right` onto `left` on the column `on`.
///
/// Every left row is kept, in left order. A left row matching N right rows
/// appears N times; an unmatched one gets nulls in the right columns. Right
/// columns whose name clashes with a left column get a `_right` suffix.
///
/// # Errors
///
/// [`EdaError::ColumnNotFound`] when either side lacks the key.
pub fn left_join(left: &Table, right: &Table, on: &str) -> Result<Table> {
    for side in [left, right] {
        if !side.has_column(on) {
            return Err(EdaError::ColumnNotFound(on.to_string())
                .with_context(format!("Joining on key of '{}'", side.name())));
        }
    }

    let left_frame = left
        .frame()
        .with_row_index(ROW_ORDER.into(), None)?;

    let mut joined = left_frame
        .lazy()
        .join(
            right.frame().clone().lazy(),
            [col(on)],
            [col(on)],
            JoinArgs::new(JoinType::Left).with_suffix(Some(RIGHT_SUFFIX.into())),
        )
        .sort([ROW_ORDER], SortMultipleOptions::default().with_maintain_order(true))
        .collect()
        .context(format!("Joining '{}' with '{}'", left.name(), right.name()))?;
    joined.drop_in_place(ROW_ORDER)?;

    let schema = joined
        .get_columns()
        .iter()
        .map(|column| {
            let name = column.name().as_str();
            ColumnMeta {
                name: name.to_string(),
                kind: joined_kind(left, right, name)
                    .unwrap_or_else(|| ColumnKind::from_dtype(column.dtype())),
            }
        })
        .collect();

    let table = Table::from_parts(
        format!("{}_{}", left.name(), right.name()),
        joined,
        schema,
    );
    info!(
        "Joined '{}' ({} rows) with '{}' on '{}': {} rows x {} columns",
        left.name(),
        left.height(),
        right.name(),
        on,
        table.height(),
        table.width()
    );
    Ok(table)
}

fn joined_kind(left: &Table, right: &Table, name: &str) -> Option<ColumnKind> {
    left.kind(name)
        .or_else(|| right.kind(name))
        .or_else(|| {
            name.strip_suffix(RIGHT_SUFFIX)
                .and_then(|base| right.kind(base))
        })
}
