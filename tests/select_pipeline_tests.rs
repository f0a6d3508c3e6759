//! SELECT pipeline tests
//!
//! Covers the clause pipeline end to end against the sample catalog:
//! - SELECT * pass-through
//! - WHERE filtering (loose comparison, idempotence, lenient fragments)
//! - GROUP BY buckets and the count column
//! - HAVING gating on GROUP BY
//! - ORDER BY stability and direction
//! - projection, aliases and aggregates

use minisql_core::{Catalog, Executor, QueryError, Row};
use serde_json::{json, Value};

fn executor() -> Executor {
    init_tracing();
    Executor::new(Catalog::sample())
}

/// Install a test subscriber so RUST_LOG surfaces the engine's stage logs
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn execute(query: &str) -> Vec<Row> {
    executor()
        .execute(query)
        .unwrap_or_else(|e| panic!("Query failed: {}: {}", query, e))
}

fn names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_select_star_returns_table_exactly() {
    let catalog = Catalog::sample();
    for table in ["employees", "orders", "products"] {
        let rows = execute(&format!("SELECT * FROM {}", table));
        assert_eq!(&rows, catalog.table(table).unwrap());
    }
}

#[test]
fn test_where_equality_scenario() {
    let rows = execute("SELECT name, department FROM employees WHERE department = 'Engineering'");

    assert_eq!(rows.len(), 3);
    assert_eq!(
        names(&rows),
        vec!["Jane Smith", "Emily Davis", "Sarah Brown"]
    );
    for row in &rows {
        let columns: Vec<&String> = row.keys().collect();
        assert_eq!(columns, vec!["name", "department"]);
        assert_eq!(row["department"], "Engineering");
    }
}

#[test]
fn test_where_is_idempotent() {
    let once = execute("SELECT * FROM employees WHERE salary > 60000");

    // Feed the result back in as its own table and re-apply the filter
    let mut catalog = Catalog::new();
    catalog.insert_table(
        "filtered",
        once.iter().cloned().map(Value::Object).collect(),
    );
    let twice = Executor::new(catalog)
        .execute("SELECT * FROM filtered WHERE salary > 60000")
        .unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_where_loose_numeric_string_equality() {
    let quoted = execute("SELECT name FROM employees WHERE salary = '60000'");
    let bare = execute("SELECT name FROM employees WHERE salary = 60000");

    assert_eq!(quoted, bare);
    assert_eq!(names(&quoted), vec!["Robert Johnson"]);
}

#[test]
fn test_where_comparison_operators() {
    assert_eq!(
        execute("SELECT * FROM employees WHERE salary >= 80000").len(),
        2
    );
    assert_eq!(
        execute("SELECT * FROM employees WHERE salary < 55000").len(),
        1
    );
    assert_eq!(
        execute("SELECT * FROM employees WHERE department != 'Engineering'").len(),
        3
    );
    assert_eq!(
        execute("SELECT * FROM employees WHERE department <> 'Engineering'").len(),
        3
    );
}

#[test]
fn test_where_and_conjunction() {
    let rows = execute(
        "SELECT name FROM employees WHERE department = 'Engineering' AND salary > 76000",
    );
    assert_eq!(names(&rows), vec!["Emily Davis", "Sarah Brown"]);
}

#[test]
fn test_malformed_fragment_dropped_not_rejected() {
    // "department" alone carries no comparison operator; the fragment is
    // silently dropped and the rest of the clause still applies.
    let rows = execute("SELECT * FROM employees WHERE department AND salary > 60000");
    assert_eq!(rows.len(), 3);

    // A clause consisting only of dropped fragments filters nothing
    let rows = execute("SELECT * FROM employees WHERE department");
    assert_eq!(rows.len(), 6);
}

#[test]
fn test_missing_field_comparisons() {
    // Rows have no "bonus" column: ordering comparisons fail, != passes
    assert_eq!(execute("SELECT * FROM employees WHERE bonus > 0").len(), 0);
    assert_eq!(execute("SELECT * FROM employees WHERE bonus = 0").len(), 0);
    assert_eq!(
        execute("SELECT * FROM employees WHERE bonus != 0").len(),
        6
    );
}

#[test]
fn test_group_by_department_scenario() {
    let rows = execute(
        "SELECT department, COUNT(*) as employee_count FROM employees GROUP BY department",
    );

    // One row per distinct department, in first-seen order
    let departments: Vec<&str> = rows
        .iter()
        .map(|row| row["department"].as_str().unwrap())
        .collect();
    assert_eq!(departments, vec!["HR", "Engineering", "Sales", "Marketing"]);

    let counts: Vec<u64> = rows
        .iter()
        .map(|row| row["employee_count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 3, 1, 1]);

    for row in &rows {
        let columns: Vec<&String> = row.keys().collect();
        assert_eq!(columns, vec!["department", "employee_count"]);
    }
}

#[test]
fn test_group_by_exposes_count_to_having() {
    let rows = execute(
        "SELECT department FROM employees GROUP BY department HAVING count > 1",
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["department"], "Engineering");
}

#[test]
fn test_count_column_projects_group_sizes() {
    let rows = execute("SELECT department, count FROM employees GROUP BY department");

    let counts: Vec<u64> = rows
        .iter()
        .map(|row| row["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 3, 1, 1]);
}

#[test]
fn test_having_without_group_by_is_ignored() {
    let rows = execute("SELECT * FROM employees HAVING salary > 60000");
    assert_eq!(rows.len(), 6);
}

#[test]
fn test_order_by_salary_desc_scenario() {
    let rows = execute("SELECT * FROM employees ORDER BY salary DESC");

    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["name"], "Sarah Brown");
    assert_eq!(rows[0]["salary"], json!(90000));
    assert_eq!(rows[5]["name"], "John Doe");
    assert_eq!(rows[5]["salary"], json!(50000));

    let salaries: Vec<u64> = rows
        .iter()
        .map(|row| row["salary"].as_u64().unwrap())
        .collect();
    let mut sorted = salaries.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(salaries, sorted);
}

#[test]
fn test_order_by_is_stable() {
    // All Engineering rows tie on the sort key and must keep table order
    let rows = execute("SELECT * FROM employees ORDER BY department");
    let engineering: Vec<&str> = rows
        .iter()
        .filter(|row| row["department"] == "Engineering")
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(engineering, vec!["Jane Smith", "Emily Davis", "Sarah Brown"]);
}

#[test]
fn test_order_by_multiple_keys() {
    let rows = execute("SELECT name FROM employees ORDER BY department ASC, salary DESC");
    assert_eq!(
        names(&rows),
        vec![
            "Sarah Brown",
            "Emily Davis",
            "Jane Smith",
            "John Doe",
            "Michael Wilson",
            "Robert Johnson",
        ]
    );
}

#[test]
fn test_aggregates_over_whole_table() {
    let rows = execute("SELECT COUNT(*), SUM(salary) as total, AVG(salary) as average FROM employees");

    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert_eq!(row["COUNT(*)"], json!(6));
        assert_eq!(row["total"], json!(410000.0));
        assert_eq!(row["average"], json!(410000.0 / 6.0));
    }
}

#[test]
fn test_sum_over_orders() {
    let rows = execute("SELECT SUM(amount) as revenue FROM orders WHERE product = 'Laptop'");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["revenue"], json!(2400.0));
}

#[test]
fn test_column_alias() {
    let rows = execute("SELECT name as employee FROM employees WHERE id = 1");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee"], "John Doe");
    assert!(rows[0].get("name").is_none());
}

#[test]
fn test_keyword_case_insensitive() {
    let upper = execute("SELECT * FROM employees WHERE department = 'HR'");
    let lower = execute("select * from employees where department = 'HR'");
    assert_eq!(upper, lower);
}

#[test]
fn test_unknown_table() {
    let err = executor().execute("SELECT * FROM nonexistent").unwrap_err();
    assert!(matches!(err, QueryError::TableNotFound(ref name) if name == "nonexistent"));
    assert_eq!(err.to_string(), "Table 'nonexistent' not found");
}

#[test]
fn test_missing_from_clause() {
    let err = executor().execute("SELECT name").unwrap_err();
    assert!(matches!(err, QueryError::MissingFromClause));
}

#[test]
fn test_unsupported_query_kind() {
    let err = executor().execute("SHOW TABLES").unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedQueryKind(_)));
}
