//! Moves values between model instances and statement parameters or result
//! rows.
//!
//! Every function visits fields in the schema's declared order, the same
//! order the [`Serializer`](keel_sql::Serializer) uses for columns and
//! placeholders.

use keel_core::{
    driver::Row,
    schema::{Field, FieldType, Schema},
    Error, Result, Value,
};

/// Appends the value of every non-identity field of `instance` to `params`.
pub fn bind_for_insert<M>(instance: &M, schema: &Schema<M>, params: &mut Vec<Value>) -> Result<()> {
    for field in schema.fields().filter(|field| !field.is_unique_id()) {
        params.push(field.get(instance)?);
    }
    Ok(())
}

/// Appends the value of every field of `instance`, identity included.
pub fn bind_exact<M>(instance: &M, schema: &Schema<M>, params: &mut Vec<Value>) -> Result<()> {
    for field in schema.fields() {
        params.push(field.get(instance)?);
    }
    Ok(())
}

/// Appends the value of every non-identity field of `instance` and returns
/// the (0-based) position of the next placeholder, which the caller binds to
/// the identity for the `WHERE` clause.
pub fn bind_for_update<M>(
    instance: &M,
    schema: &Schema<M>,
    params: &mut Vec<Value>,
) -> Result<usize> {
    bind_for_insert(instance, schema, params)?;
    Ok(params.len())
}

/// Reads one column per field from `row`, starting at `start`, into
/// `instance`. Returns the index just past the consumed columns so that
/// joined rows can be parsed one schema after another.
pub fn load_fields<M>(
    instance: &mut M,
    schema: &Schema<M>,
    row: &mut Row,
    start: usize,
) -> Result<usize> {
    if row.len() < start + schema.num_fields() {
        return Err(Error::invalid_result(format!(
            "row of {} columns cannot hold {} fields of `{}` starting at column {start}",
            row.len(),
            schema.num_fields(),
            schema.table_name()
        )));
    }

    let mut index = start;
    for field in schema.fields() {
        let value = from_raw(field, row.take(index)?)?;
        field.set(instance, value)?;
        index += 1;
    }
    Ok(index)
}

/// Writes generated keys into the identity field of `instances`, in order.
pub fn capture_generated_ids<M>(
    instances: &mut [M],
    schema: &Schema<M>,
    keys: &[Value],
) -> Result<()> {
    let id = schema.unique_id_field()?;

    if keys.len() < instances.len() {
        return Err(Error::invalid_result(format!(
            "expected {} generated keys for `{}`, got {}",
            instances.len(),
            schema.table_name(),
            keys.len()
        )));
    }

    for (instance, key) in instances.iter_mut().zip(keys) {
        id.set(instance, from_raw(id, key.clone())?)?;
    }
    Ok(())
}

/// Converts a value as returned by a driver into the field's semantic
/// representation.
pub fn from_raw<M>(field: &Field<M>, raw: Value) -> Result<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    match field.ty() {
        FieldType::Bool => match raw {
            Value::Bool(_) => Ok(raw),
            raw => match raw.as_i64() {
                Some(v) => Ok(Value::Bool(v != 0)),
                None => Err(Error::type_conversion(raw, "bool")),
            },
        },
        FieldType::Enum(tags) => {
            let tag = raw
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| Error::type_conversion(raw.clone(), tags.type_name()))?;
            if !tags.contains(tag) {
                return Err(Error::type_conversion(raw, tags.type_name()));
            }
            Ok(Value::Enum(tag))
        }
        FieldType::String => match raw {
            Value::String(_) => Ok(raw),
            raw => Err(Error::type_conversion(raw, "String")),
        },
        FieldType::Short | FieldType::Int | FieldType::Long => match raw {
            Value::I16(_) | Value::I32(_) | Value::I64(_) => Ok(raw),
            raw => Err(Error::type_conversion(raw, field.ty().name())),
        },
    }
}
