use crate::{Error, Result, Value};

/// Outcome of executing a statement that returns no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecResult {
    pub rows_affected: u64,

    /// Keys generated for inserted rows, in insertion order. Empty unless the
    /// statement was prepared with generated keys requested.
    pub generated_keys: Vec<Value>,
}

/// One result row, column values in select-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes the value at `index` out of the row, leaving `Null` behind.
    pub fn take(&mut self, index: usize) -> Result<Value> {
        let len = self.values.len();
        self.values
            .get_mut(index)
            .map(std::mem::take)
            .ok_or_else(|| {
                Error::invalid_result(format!("column {index} out of range for a row of {len}"))
            })
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

pub type Rows = Vec<Row>;
