//! Module defining inventory items: a common base plus a kind-specific extension, selected by the `kind` field.

use rust_decimal::Decimal;

use crate::domain::{Record, Value};

const KIND_PLAIN: &str = "plain";
const KIND_FURNITURE: &str = "furniture";
const KIND_ELECTRIC_APPLIANCE: &str = "electric_appliance";

/// An item of the rental inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub product_code: String,
    pub description: String,
    pub market_price: Decimal,
    pub rental_price: Decimal,
    pub kind: ItemKind,
}

/// The fields specific to a kind of item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Plain,
    Furniture { material: String, size: String },
    ElectricAppliance { brand: String, voltage: String },
}

impl ItemKind {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ItemKind::Plain => KIND_PLAIN,
            ItemKind::Furniture { .. } => KIND_FURNITURE,
            ItemKind::ElectricAppliance { .. } => KIND_ELECTRIC_APPLIANCE,
        }
    }
}

impl From<&InventoryItem> for Record {
    fn from(item: &InventoryItem) -> Self {
        let mut record = Record::new()
            .with("product_code", item.product_code.as_str())
            .with("description", item.description.as_str())
            .with("market_price", item.market_price)
            .with("rental_price", item.rental_price)
            .with("kind", item.kind.discriminant());
        match &item.kind {
            ItemKind::Plain => {}
            ItemKind::Furniture { material, size } => {
                record.insert("material", material.as_str());
                record.insert("size", size.as_str());
            }
            ItemKind::ElectricAppliance { brand, voltage } => {
                record.insert("brand", brand.as_str());
                record.insert("voltage", voltage.as_str());
            }
        }
        record
    }
}

impl TryFrom<&Record> for InventoryItem {
    type Error = String;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let kind = match text(record, "kind")?.as_str() {
            KIND_PLAIN => ItemKind::Plain,
            KIND_FURNITURE => ItemKind::Furniture {
                material: text(record, "material")?,
                size: text(record, "size")?,
            },
            KIND_ELECTRIC_APPLIANCE => ItemKind::ElectricAppliance {
                brand: text(record, "brand")?,
                voltage: text(record, "voltage")?,
            },
            other => return Err(format!("unknown inventory kind `{other}`")),
        };
        Ok(Self {
            product_code: text(record, "product_code")?,
            description: text(record, "description")?,
            market_price: decimal(record, "market_price")?,
            rental_price: decimal(record, "rental_price")?,
            kind,
        })
    }
}

fn text(record: &Record, field: &str) -> Result<String, String> {
    match record.get(field) {
        Some(Value::Null) | None => Err(format!("missing field `{field}`")),
        Some(value) => Ok(value.to_string()),
    }
}

fn decimal(record: &Record, field: &str) -> Result<Decimal, String> {
    match record.get(field) {
        Some(Value::Decimal(d)) => Ok(*d),
        Some(Value::Text(s)) => s
            .parse()
            .map_err(|e| format!("field `{field}`: `{s}` is not a decimal: {e}")),
        _ => Err(format!("missing field `{field}`")),
    }
}
