//! Query executor: evaluates parsed statements against a catalog.
//!
//! Every stage is a pure table-to-table transform applied in fixed order:
//! FROM -> WHERE -> GROUP BY -> HAVING -> ORDER BY -> projection, with
//! UNION/INTERSECT/EXCEPT combining two independently evaluated SELECTs.
//! The executor never mutates the catalog, so one instance can serve
//! concurrent callers.

mod helpers;

pub use helpers::*;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::catalog::{Catalog, Row, Table};
use crate::error::{QueryError, QueryResult};
use crate::parser::{
    AggregateFunc, CompareOp, Condition, ConditionExpr, OrderByItem, Parser, SelectColumn,
    SelectStatement, SetOp, Statement,
};

/// Column added to every grouped row, holding the bucket's source row count.
const GROUP_COUNT_COLUMN: &str = "count";

/// Execution behavior switches.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutorConfig {
    /// When true (the default), WHERE/HAVING condition trees are flattened
    /// to a pure conjunction of their comparison terms, reproducing the
    /// legacy evaluation in which OR connectives were recorded but ignored.
    /// Set to false to honor the AND/OR structure as written.
    #[serde(default = "default_flatten_connectives")]
    pub flatten_connectives: bool,
}

fn default_flatten_connectives() -> bool {
    true
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            flatten_connectives: default_flatten_connectives(),
        }
    }
}

/// Query executor over a fixed catalog.
pub struct Executor {
    catalog: Catalog,
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor with the default (legacy-compatible) config
    pub fn new(catalog: Catalog) -> Self {
        Self::with_config(catalog, ExecutorConfig::default())
    }

    pub fn with_config(catalog: Catalog, config: ExecutorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute a query string and materialize the full result table.
    pub fn execute(&self, query: &str) -> QueryResult<Table> {
        let query = query.trim();
        debug!(query, "executing query");

        let statement = Parser::new(query)?.parse()?;
        self.execute_statement(&statement)
    }

    fn execute_statement(&self, statement: &Statement) -> QueryResult<Table> {
        match statement {
            Statement::Select(select) => self.execute_select(select),
            Statement::Compound { op, left, right } => self.execute_compound(*op, left, right),
        }
    }

    fn execute_select(&self, select: &SelectStatement) -> QueryResult<Table> {
        let mut rows = self
            .catalog
            .table(&select.from)
            .ok_or_else(|| QueryError::TableNotFound(select.from.clone()))?
            .clone();

        if let Some(condition) = &select.where_clause {
            rows = self.apply_filter(rows, condition);
            debug!(rows = rows.len(), "applied WHERE");
        }

        if !select.group_by.is_empty() {
            rows = apply_group_by(rows, &select.group_by);
            debug!(groups = rows.len(), "applied GROUP BY");

            // HAVING is only honored alongside GROUP BY
            if let Some(condition) = &select.having {
                rows = self.apply_filter(rows, condition);
                debug!(rows = rows.len(), "applied HAVING");
            }
        }

        if !select.order_by.is_empty() {
            apply_order_by(&mut rows, &select.order_by);
        }

        Ok(apply_projection(rows, &select.columns))
    }

    fn execute_compound(
        &self,
        op: SetOp,
        left: &SelectStatement,
        right: &SelectStatement,
    ) -> QueryResult<Table> {
        let left_rows = self.execute_select(left)?;
        let right_rows = self.execute_select(right)?;
        debug!(
            ?op,
            left = left_rows.len(),
            right = right_rows.len(),
            "combining set operation"
        );

        Ok(match op {
            // Simple union: left then right, duplicates kept
            SetOp::Union => {
                let mut rows = left_rows;
                rows.extend(right_rows);
                rows
            }
            SetOp::Intersect => {
                let right_keys: HashSet<String> =
                    right_rows.iter().map(row_signature).collect();
                left_rows
                    .into_iter()
                    .filter(|row| right_keys.contains(&row_signature(row)))
                    .collect()
            }
            SetOp::Except => {
                let right_keys: HashSet<String> =
                    right_rows.iter().map(row_signature).collect();
                left_rows
                    .into_iter()
                    .filter(|row| !right_keys.contains(&row_signature(row)))
                    .collect()
            }
        })
    }

    fn apply_filter(&self, rows: Table, condition: &ConditionExpr) -> Table {
        if self.config.flatten_connectives {
            let conditions = condition.leaves();
            rows.into_iter()
                .filter(|row| {
                    conditions
                        .iter()
                        .all(|condition| evaluate_condition(row, condition))
                })
                .collect()
        } else {
            rows.into_iter()
                .filter(|row| evaluate_expr(row, condition))
                .collect()
        }
    }
}

fn evaluate_expr(row: &Row, expr: &ConditionExpr) -> bool {
    match expr {
        ConditionExpr::Leaf(condition) => evaluate_condition(row, condition),
        ConditionExpr::And(left, right) => evaluate_expr(row, left) && evaluate_expr(row, right),
        ConditionExpr::Or(left, right) => evaluate_expr(row, left) || evaluate_expr(row, right),
    }
}

fn evaluate_condition(row: &Row, condition: &Condition) -> bool {
    let actual = row.get(&condition.field).cloned().unwrap_or(Value::Null);

    match condition.op {
        CompareOp::Eq => loose_equal(&actual, &condition.value),
        CompareOp::NotEq => !loose_equal(&actual, &condition.value),
        CompareOp::Gt => compare_loose(&actual, &condition.value) == Some(Ordering::Greater),
        CompareOp::Lt => compare_loose(&actual, &condition.value) == Some(Ordering::Less),
        CompareOp::GtEq => matches!(
            compare_loose(&actual, &condition.value),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        CompareOp::LtEq => matches!(
            compare_loose(&actual, &condition.value),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
    }
}

/// Partition rows into first-seen-order buckets keyed by the grouping
/// field values. Each bucket yields its first row plus a `count` column.
fn apply_group_by(rows: Table, fields: &[String]) -> Table {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(Row, usize)> = Vec::new();

    for row in rows {
        let key = fields
            .iter()
            .map(|field| order_text(row.get(field).unwrap_or(&Value::Null)))
            .collect::<Vec<_>>()
            .join("|");

        match index.get(&key) {
            Some(&i) => buckets[i].1 += 1,
            None => {
                index.insert(key, buckets.len());
                buckets.push((row, 1));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(mut row, count)| {
            row.insert(GROUP_COUNT_COLUMN.to_string(), Value::from(count as u64));
            row
        })
        .collect()
}

/// Stable multi-key sort: the first non-equal key decides, ties fall
/// through to the next key, full ties keep their input order.
fn apply_order_by(rows: &mut Table, items: &[OrderByItem]) {
    rows.sort_by(|a, b| {
        for item in items {
            let left = a.get(&item.field).unwrap_or(&Value::Null);
            let right = b.get(&item.field).unwrap_or(&Value::Null);

            let mut ordering = sort_compare(left, right);
            if item.descending {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn apply_projection(rows: Table, columns: &[SelectColumn]) -> Table {
    if columns.len() == 1 && columns[0] == SelectColumn::Star {
        return rows;
    }

    rows.iter()
        .map(|row| {
            let mut out = Row::new();

            for column in columns {
                match column {
                    // A star mixed into a longer column list projects nothing
                    SelectColumn::Star => {}
                    SelectColumn::Column { name, alias } => {
                        let key = alias.clone().unwrap_or_else(|| name.clone());
                        let value = row.get(name).cloned().unwrap_or(Value::Null);
                        out.insert(key, value);
                    }
                    SelectColumn::Aggregate { func, arg, alias } => {
                        let key = alias
                            .clone()
                            .unwrap_or_else(|| format!("{}({})", func.name(), arg));
                        out.insert(key, compute_aggregate(*func, arg, row, &rows));
                    }
                }
            }

            out
        })
        .collect()
}

/// Compute an aggregate over the table staged at projection time. For a
/// grouped table, COUNT resolves to the row's own `count` column so each
/// group reports its bucket size.
fn compute_aggregate(func: AggregateFunc, arg: &str, row: &Row, rows: &Table) -> Value {
    match func {
        AggregateFunc::Count => match row.get(GROUP_COUNT_COLUMN) {
            Some(count) => count.clone(),
            None => Value::from(rows.len() as u64),
        },
        AggregateFunc::Sum => Value::Number(number_from_f64(sum_field(rows, arg))),
        AggregateFunc::Avg => {
            let total = sum_field(rows, arg);
            let avg = if rows.is_empty() {
                0.0
            } else {
                total / rows.len() as f64
            };
            Value::Number(number_from_f64(avg))
        }
    }
}

fn sum_field(rows: &Table, field: &str) -> f64 {
    rows.iter()
        .map(|row| numeric_or_zero(row.get(field)))
        .sum()
}

/// Full-row identity for INTERSECT/EXCEPT membership: serialized JSON
/// text, so the comparison is column-order-sensitive and value-exact.
fn row_signature(row: &Row) -> String {
    serde_json::to_string(row).unwrap_or_default()
}
