use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
///
/// `id` is ignored on create; on replace it must match the path when sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
}

/// Digits after the decimal point the `price` column keeps.
pub const PRICE_SCALE: u32 = 2;
/// Digits before the decimal point the `price` column keeps (`numeric(16,2)`).
pub const PRICE_INTEGER_DIGITS: u32 = 14;

/// Price must be strictly positive and fit the column exactly.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut error = ValidationError::new("price_not_positive");
        error.message = Some("price must be greater than 0".into());
        return Err(error);
    }
    if price.normalize().scale() > PRICE_SCALE {
        let mut error = ValidationError::new("price_scale");
        error.message = Some(format!("price must have at most {} decimal places", PRICE_SCALE).into());
        return Err(error);
    }
    if *price >= Decimal::from(10u64.pow(PRICE_INTEGER_DIGITS)) {
        let mut error = ValidationError::new("price_too_large");
        error.message = Some(format!("price must be below 10^{}", PRICE_INTEGER_DIGITS).into());
        return Err(error);
    }
    Ok(())
}
