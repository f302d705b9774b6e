//! What a read, a write or a batch returns.

use serde::Serialize;

use crate::value::Value;

/// Tabular result of a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// The value of the named column in the given row.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Result of a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateResult {
    /// Number of rows the statement affected.
    pub updated: u64,
    /// First column of every row the statement returned, e.g. through
    /// `RETURNING id`. Empty when the statement returns nothing.
    pub keys: Vec<Value>,
}

/// Affected-row counts of a batch, one per parameter set, in input order.
pub type BatchResult = Vec<u64>;

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> ResultSet {
        ResultSet::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::Int(1), Value::from("ada")],
                vec![Value::Int(2), Value::Null],
            ],
        )
    }

    #[test]
    fn looks_up_values_by_column_name() {
        let result = users();
        assert_eq!(result.get(0, "name"), Some(&Value::from("ada")));
        assert_eq!(result.get(1, "id"), Some(&Value::Int(2)));
        assert_eq!(result.get(2, "id"), None);
        assert_eq!(result.get(0, "email"), None);
    }
}
