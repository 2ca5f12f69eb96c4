//! JSON dataset row source
//!
//! The dataset is an object keyed by entity type name; each key holds the rows a
//! `from <Type>` query returns, in order:
//!
//! ```json
//! {
//!   "com.example.Person": [
//!     { "$type": "com.example.Person", "name": "Ann",
//!       "contacts": [ { "$type": "com.example.EmailContact", "email": "ann@example.com" } ] }
//!   ]
//! }
//! ```
//!
//! Rows are converted to instances lazily, per query, so a malformed row only breaks
//! queries against its own table.

use std::fs;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde_json::{Map, Value as JsonValue};

use super::{FilterQuery, RowSource, select_all};
use crate::constants::{
    KEY_ITEMS, KEY_TYPE, KEY_VALUE, TYPE_ARRAY_LIST, TYPE_BOOLEAN, TYPE_DOUBLE, TYPE_LONG,
    TYPE_STRING,
};
use crate::error::{Error, Result};
use crate::model::{Instance, TypeName, Value};

#[derive(Debug, Clone)]
pub struct JsonRowSource {
    tables: Map<String, JsonValue>,
}

impl JsonRowSource {
    /// Load a dataset file
    ///
    /// A missing file or a document that is not a JSON object is a configuration error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .change_context(Error::failed_to("read dataset", path.display()))?;
        let document: JsonValue = serde_json::from_str(&text)
            .change_context(Error::invalid("dataset", path.display()))?;
        Self::from_json(document).attach(format!("Dataset path: {}", path.display()))
    }

    pub fn from_json(document: JsonValue) -> Result<Self> {
        match document {
            JsonValue::Object(tables) => Ok(Self { tables }),
            other => Err(Report::new(Error::invalid(
                "dataset",
                format!("expected an object keyed by entity type, found {other}"),
            ))),
        }
    }

    /// Rows of one table converted to instances
    fn rows(&self, entity: &TypeName, query_text: &str) -> Result<Vec<Instance>> {
        let rows = self
            .tables
            .get(entity.as_str())
            .ok_or_else(|| Error::query_failed(query_text, format!("unknown entity type {entity}")))?;
        let JsonValue::Array(rows) = rows else {
            return Err(Error::query_failed(
                query_text,
                format!("rows of {entity} are not an array"),
            )
            .into());
        };

        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                instance_from_json(entity, row).map_err(|reason| {
                    Report::new(Error::query_failed(
                        query_text,
                        format!("row {index} of {entity}: {reason}"),
                    ))
                })
            })
            .collect()
    }
}

impl RowSource for JsonRowSource {
    fn query(&self, query: &FilterQuery) -> Result<Vec<Instance>> {
        let query_text = query.to_string();
        let mut matching = Vec::new();
        for instance in self.rows(&query.owner, &query_text)? {
            if query.matches(&instance)? {
                matching.push(instance);
            }
        }
        Ok(matching)
    }

    fn query_all(&self, entity: &TypeName) -> Result<Vec<Instance>> {
        self.rows(entity, &select_all(entity))
    }
}

/// Convert one row; the row's type defaults to the table it is stored in
fn instance_from_json(
    table: &TypeName,
    row: &JsonValue,
) -> std::result::Result<Instance, String> {
    let JsonValue::Object(fields) = row else {
        return Err(format!("expected an object, found {row}"));
    };
    let type_name = match fields.get(KEY_TYPE) {
        Some(declared) => type_tag(declared)?,
        None => table.clone(),
    };
    object_to_instance(type_name, fields)
}

fn object_to_instance(
    type_name: TypeName,
    fields: &Map<String, JsonValue>,
) -> std::result::Result<Instance, String> {
    let properties = fields
        .iter()
        .filter(|(key, _)| key.as_str() != KEY_TYPE)
        .map(|(key, json)| value_from_json(json).map(|value| (key.clone(), value)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Instance {
        type_name,
        properties,
    })
}

fn value_from_json(json: &JsonValue) -> std::result::Result<Value, String> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(flag) => Ok(scalar(TYPE_BOOLEAN, flag.to_string())),
        JsonValue::Number(number) if number.is_i64() || number.is_u64() => {
            Ok(scalar(TYPE_LONG, number.to_string()))
        }
        JsonValue::Number(number) => Ok(scalar(TYPE_DOUBLE, number.to_string())),
        JsonValue::String(text) => Ok(scalar(TYPE_STRING, text.clone())),
        JsonValue::Array(items) => Ok(Value::Collection {
            type_name: TYPE_ARRAY_LIST.into(),
            items:     items
                .iter()
                .map(value_from_json)
                .collect::<std::result::Result<_, _>>()?,
        }),
        JsonValue::Object(fields) => object_value(fields),
    }
}

/// Typed scalar, typed collection or nested entity
fn object_value(fields: &Map<String, JsonValue>) -> std::result::Result<Value, String> {
    let type_name = fields.get(KEY_TYPE).map(type_tag).transpose()?;

    if let Some(items) = fields.get(KEY_ITEMS) {
        let JsonValue::Array(items) = items else {
            return Err(format!("'{KEY_ITEMS}' must be an array"));
        };
        return Ok(Value::Collection {
            type_name: type_name.unwrap_or_else(|| TYPE_ARRAY_LIST.into()),
            items:     items
                .iter()
                .map(value_from_json)
                .collect::<std::result::Result<_, _>>()?,
        });
    }

    let Some(type_name) = type_name else {
        return Err(format!("nested object without '{KEY_TYPE}'"));
    };

    if let Some(raw) = fields.get(KEY_VALUE) {
        let text = match raw {
            JsonValue::String(text) => text.clone(),
            JsonValue::Null => return Ok(Value::Null),
            other => other.to_string(),
        };
        return Ok(Value::Scalar { type_name, text });
    }

    object_to_instance(type_name, fields).map(|instance| Value::Entity(Box::new(instance)))
}

fn type_tag(json: &JsonValue) -> std::result::Result<TypeName, String> {
    json.as_str()
        .filter(|name| !name.is_empty())
        .map(TypeName::from)
        .ok_or_else(|| format!("'{KEY_TYPE}' must be a non-empty string, found {json}"))
}

fn scalar(type_name: &str, text: String) -> Value {
    Value::Scalar {
        type_name: type_name.into(),
        text,
    }
}
