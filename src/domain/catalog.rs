//! Built-in collection schemas.

use crate::domain::Record;
use crate::domain::inventory::InventoryItem;
use crate::domain::schema::{CollectionSchema, FieldDef, FieldDefault, FieldType};

pub const CUSTOMERS: &str = "customers";
pub const PRODUCTS: &str = "products";
pub const RENTALS: &str = "rentals";
pub const INVENTORY: &str = "inventory";

/// Names of all built-in collections, parents before children.
pub const NAMES: [&str; 4] = [CUSTOMERS, PRODUCTS, RENTALS, INVENTORY];

/// Customer records; the input order is id, first name, last name, address, phone, email, status, credit limit.
pub fn customers() -> CollectionSchema {
    CollectionSchema::new(CUSTOMERS, FieldDef::new("customer_id", FieldType::text(30)))
        .with_field(FieldDef::new("first_name", FieldType::text(30)))
        .with_field(FieldDef::new("last_name", FieldType::text(30)))
        .with_field(FieldDef::new("home_address", FieldType::text(200)).nullable())
        .with_field(FieldDef::new("phone_number", FieldType::text(20)).nullable())
        .with_field(FieldDef::new("email_address", FieldType::text(30)).nullable())
        .with_field(FieldDef::new("status", FieldType::Flag))
        .with_field(FieldDef::new("credit_limit", FieldType::decimal(10, 2)).nullable())
        .with_field(
            FieldDef::new("date_created", FieldType::Timestamp).generated(FieldDefault::CreatedAt),
        )
        .with_field(
            FieldDef::new("date_modified", FieldType::Timestamp).generated(FieldDefault::UpdatedAt),
        )
}

pub fn products() -> CollectionSchema {
    CollectionSchema::new(PRODUCTS, FieldDef::new("product_id", FieldType::text(30)))
        .with_field(FieldDef::new("description", FieldType::text(200)))
        .with_field(FieldDef::new("product_type", FieldType::text(30)))
        .with_field(FieldDef::new("quantity_available", FieldType::Integer))
}

pub fn rentals() -> CollectionSchema {
    CollectionSchema::new(RENTALS, FieldDef::new("rental_id", FieldType::text(30)))
        .with_field(FieldDef::new("product_id", FieldType::text(30)).references(PRODUCTS))
        .with_field(FieldDef::new("customer_id", FieldType::text(30)).references(CUSTOMERS))
}

/// Inventory items; `kind` selects which of the extension fields are populated.
pub fn inventory() -> CollectionSchema {
    CollectionSchema::new(INVENTORY, FieldDef::new("product_code", FieldType::text(30)))
        .with_field(FieldDef::new("description", FieldType::text(200)))
        .with_field(FieldDef::new("market_price", FieldType::decimal(10, 2)))
        .with_field(FieldDef::new("rental_price", FieldType::decimal(10, 2)))
        .with_field(FieldDef::new("kind", FieldType::text(20)))
        .with_field(FieldDef::new("material", FieldType::text(30)).nullable())
        .with_field(FieldDef::new("size", FieldType::text(10)).nullable())
        .with_field(FieldDef::new("brand", FieldType::text(30)).nullable())
        .with_field(FieldDef::new("voltage", FieldType::text(10)).nullable())
}

pub fn by_name(name: &str) -> Option<CollectionSchema> {
    match name {
        CUSTOMERS => Some(customers()),
        PRODUCTS => Some(products()),
        RENTALS => Some(rentals()),
        INVENTORY => Some(inventory()),
        _ => None,
    }
}

/// Checks a coerced record against rules of its collection that span several fields.
pub(crate) fn check_record(collection: &str, record: &Record) -> Result<(), String> {
    match collection {
        INVENTORY => InventoryItem::try_from(record).map(drop),
        _ => Ok(()),
    }
}
