use keel_core::{Error, Result, Value as CoreValue};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this MySQL driver value into the core Keel value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    pub fn to_mysql(&self) -> mysql::Value {
        match &self.0 {
            CoreValue::Null => mysql::Value::NULL,
            CoreValue::Bool(value) => mysql::Value::Int(*value as i64),
            CoreValue::I16(value) => mysql::Value::Int(*value as i64),
            CoreValue::I32(value) => mysql::Value::Int(*value as i64),
            CoreValue::I64(value) => mysql::Value::Int(*value),
            CoreValue::Enum(tag) => mysql::Value::Int(*tag as i64),
            CoreValue::String(value) => mysql::Value::Bytes(value.clone().into_bytes()),
        }
    }

    /// Converts the value of column `index` to a Keel value. Integers are
    /// returned as `I64`.
    pub fn from_mysql(value: &mysql::Value, index: usize) -> Result<Self> {
        let core_value = match value {
            mysql::Value::NULL => CoreValue::Null,
            mysql::Value::Int(value) => CoreValue::I64(*value),
            mysql::Value::UInt(value) => CoreValue::I64(i64::try_from(*value).map_err(|_| {
                Error::invalid_result(format!("column {index}: {value} is out of range"))
            })?),
            mysql::Value::Bytes(bytes) => CoreValue::String(
                String::from_utf8(bytes.clone()).map_err(Error::driver)?,
            ),
            other => {
                return Err(Error::invalid_result(format!(
                    "column {index} holds unsupported value {other:?}"
                )))
            }
        };
        Ok(Value(core_value))
    }
}
