//! Catalog of named in-memory tables.
//!
//! The catalog is built once by the host before any query runs and is
//! never written by the engine, so it can be shared freely across
//! concurrent calls.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

/// One result or source row: an ordered column -> value mapping.
pub type Row = Map<String, Value>;

/// An ordered sequence of rows sharing one column set.
pub type Table = Vec<Row>;

/// Fixed mapping from table name to table. Names are case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table from JSON object rows. Non-object values are ignored.
    pub fn insert_table(&mut self, name: &str, rows: Vec<Value>) {
        let table: Table = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect();
        self.tables.insert(name.to_string(), table);
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Check if a table exists
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// List all table names
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// The built-in sample dataset: three small tables shared by hosts,
    /// demos and tests.
    pub fn sample() -> Self {
        let mut catalog = Self::new();

        catalog.insert_table(
            "employees",
            vec![
                json!({"id": 1, "name": "John Doe", "department": "HR", "salary": 50000, "hire_date": "2020-03-15"}),
                json!({"id": 2, "name": "Jane Smith", "department": "Engineering", "salary": 75000, "hire_date": "2019-07-22"}),
                json!({"id": 3, "name": "Robert Johnson", "department": "Sales", "salary": 60000, "hire_date": "2021-01-10"}),
                json!({"id": 4, "name": "Emily Davis", "department": "Engineering", "salary": 80000, "hire_date": "2018-11-05"}),
                json!({"id": 5, "name": "Michael Wilson", "department": "Marketing", "salary": 55000, "hire_date": "2022-05-30"}),
                json!({"id": 6, "name": "Sarah Brown", "department": "Engineering", "salary": 90000, "hire_date": "2017-09-12"}),
            ],
        );

        catalog.insert_table(
            "orders",
            vec![
                json!({"order_id": 101, "customer_id": 1, "product": "Laptop", "amount": 1200, "order_date": "2023-01-15"}),
                json!({"order_id": 102, "customer_id": 2, "product": "Mouse", "amount": 25, "order_date": "2023-01-16"}),
                json!({"order_id": 103, "customer_id": 1, "product": "Keyboard", "amount": 75, "order_date": "2023-01-20"}),
                json!({"order_id": 104, "customer_id": 3, "product": "Monitor", "amount": 300, "order_date": "2023-02-05"}),
                json!({"order_id": 105, "customer_id": 2, "product": "Laptop", "amount": 1200, "order_date": "2023-02-10"}),
                json!({"order_id": 106, "customer_id": 4, "product": "Tablet", "amount": 500, "order_date": "2023-02-15"}),
            ],
        );

        catalog.insert_table(
            "products",
            vec![
                json!({"product_id": 1, "name": "Laptop", "category": "Electronics", "price": 1200, "stock": 15}),
                json!({"product_id": 2, "name": "Mouse", "category": "Accessories", "price": 25, "stock": 50}),
                json!({"product_id": 3, "name": "Keyboard", "category": "Accessories", "price": 75, "stock": 30}),
                json!({"product_id": 4, "name": "Monitor", "category": "Electronics", "price": 300, "stock": 20}),
                json!({"product_id": 5, "name": "Tablet", "category": "Electronics", "price": 500, "stock": 10}),
            ],
        );

        catalog
    }
}
