//! Module defining the shape of destination collections and the coercion of raw records into that shape.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::{DATE_FORMAT, Record, TIMESTAMP_FORMAT, Value};

/// The declared type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text { max_len: usize },
    Decimal { max_digits: u32, decimal_places: u32 },
    Integer,
    Date,
    Timestamp,
    /// A status flag; `active`, `true` and `1` are set, everything else is unset.
    Flag,
}

impl FieldType {
    pub fn text(max_len: usize) -> Self {
        FieldType::Text { max_len }
    }

    pub fn decimal(max_digits: u32, decimal_places: u32) -> Self {
        FieldType::Decimal {
            max_digits,
            decimal_places,
        }
    }

    fn coerce(&self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (FieldType::Text { max_len }, value) => {
                let text = value.to_string();
                let len = text.chars().count();
                if len > *max_len {
                    Err(format!("text of length {len} exceeds the maximum of {max_len}"))
                } else {
                    Ok(Value::Text(text))
                }
            }
            (
                FieldType::Decimal {
                    max_digits,
                    decimal_places,
                },
                value,
            ) => {
                let decimal = match value {
                    Value::Decimal(d) => d,
                    Value::Integer(i) => Decimal::from(i),
                    Value::Text(s) => Decimal::from_str(s.trim())
                        .map_err(|e| format!("`{s}` is not a decimal: {e}"))?,
                    other => return Err(format!("`{other}` is not a decimal")),
                };
                let decimal = decimal.round_dp(*decimal_places);
                if let Some(limit) = decimal_limit(*max_digits, *decimal_places) {
                    if decimal.abs() >= limit {
                        return Err(format!(
                            "{decimal} does not fit into {max_digits} digits with {decimal_places} decimal places"
                        ));
                    }
                }
                Ok(Value::Decimal(decimal))
            }
            (FieldType::Integer, value) => match value {
                Value::Integer(i) => Ok(Value::Integer(i)),
                Value::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|e| format!("`{s}` is not an integer: {e}")),
                other => Err(format!("`{other}` is not an integer")),
            },
            (FieldType::Date, value) => match value {
                Value::Date(d) => Ok(Value::Date(d)),
                Value::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|e| format!("`{s}` is not a date: {e}")),
                other => Err(format!("`{other}` is not a date")),
            },
            (FieldType::Timestamp, value) => match value {
                Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
                Value::Text(s) => parse_timestamp(s.trim())
                    .map(Value::Timestamp)
                    .ok_or_else(|| format!("`{s}` is not a timestamp")),
                other => Err(format!("`{other}` is not a timestamp")),
            },
            (FieldType::Flag, value) => match value {
                Value::Flag(flag) => Ok(Value::Flag(flag)),
                Value::Integer(i) => Ok(Value::Flag(i == 1)),
                Value::Text(s) => Ok(Value::Flag(matches!(
                    s.trim().to_lowercase().as_str(),
                    "active" | "true" | "1"
                ))),
                other => Err(format!("`{other}` is not a status flag")),
            },
        }
    }
}

// Exclusive upper bound of the absolute value, `None` when it exceeds what a Decimal can express anyway
fn decimal_limit(max_digits: u32, decimal_places: u32) -> Option<Decimal> {
    let integer_digits = max_digits.checked_sub(decimal_places)?;
    let limit = 10i128.checked_pow(integer_digits)?;
    Decimal::try_from_i128_with_scale(limit, 0).ok()
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| NaiveDateTime::from_str(s).ok())
}

/// Values generated by the store instead of being read from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Set once, when the record is created
    CreatedAt,
    /// Set when the record is created and refreshed on every update
    UpdatedAt,
}

/// Declaration of a single field of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
    nullable: bool,
    default: Option<FieldDefault>,
    references: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            default: None,
            references: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the field as generated; generated fields are not part of the input line.
    pub fn generated(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Declares the field as a foreign key onto the primary key of `collection`.
    pub fn references(mut self, collection: impl Into<String>) -> Self {
        self.references = Some(collection.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> Option<FieldDefault> {
        self.default
    }

    pub fn referenced_collection(&self) -> Option<&str> {
        self.references.as_deref()
    }
}

/// Declaration of a destination collection: its primary key and the remaining fields, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    name: String,
    primary_key: String,
    fields: Vec<FieldDef>,
}

impl CollectionSchema {
    /// Creates a schema whose first field is the (never nullable) primary key.
    pub fn new(name: impl Into<String>, primary_key: FieldDef) -> Self {
        let primary_key = FieldDef {
            nullable: false,
            ..primary_key
        };
        Self {
            name: name.into(),
            primary_key: primary_key.name.clone(),
            fields: vec![primary_key],
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the fields expected on an input line, in order.
    pub fn input_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.default.is_none())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Pairs of (field name, referenced collection).
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|f| {
            f.references
                .as_deref()
                .map(|collection| (f.name.as_str(), collection))
        })
    }

    /// Checks that the declaration itself is consistent.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("collection name must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err("field names must not be empty".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("field `{}` declared twice", field.name));
            }
            if field.default.is_some() && field.field_type != FieldType::Timestamp {
                return Err(format!(
                    "generated field `{}` must be a timestamp",
                    field.name
                ));
            }
            if let Some(target) = &field.references {
                if target.trim().is_empty() {
                    return Err(format!(
                        "foreign key `{}` references no collection",
                        field.name
                    ));
                }
            }
        }
        if self.field(&self.primary_key).is_some_and(|pk| pk.default.is_some()) {
            return Err("the primary key cannot be generated".to_string());
        }
        Ok(())
    }

    /// Coerces every field of `record` into its declared type and fills generated fields with `now`.
    ///
    /// Fails on unknown fields, missing required fields and values that do not fit their declared type.
    pub(crate) fn coerce(&self, mut record: Record, now: NaiveDateTime) -> Result<Record, String> {
        let mut coerced = Record::new();
        for field in &self.fields {
            let value = record.remove(&field.name).unwrap_or(Value::Null);
            let value = match (value, field.default) {
                (Value::Null, Some(_)) => Value::Timestamp(now),
                (value, _) => field
                    .field_type
                    .coerce(value)
                    .map_err(|msg| format!("field `{}`: {msg}", field.name))?,
            };
            if value.is_null() && !field.nullable {
                return Err(format!("field `{}` is required", field.name));
            }
            coerced.insert(field.name.clone(), value);
        }
        if let Some((unknown, _)) = record.fields().next() {
            return Err(format!("unknown field `{unknown}`"));
        }
        Ok(coerced)
    }
}
