//! # Host Model
//!
//! Plain data shared between the host and the module: identifiers, stock levels,
//! the product handle returned by the loader, log records and the stock-change event.

use crate::error::InvalidProductId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
///
/// Always positive. The only way to build one from untrusted input is [`ProductId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(raw: u32) -> Result<Self, InvalidProductId> {
        if raw == 0 {
            return Err(InvalidProductId::NonPositive(0));
        }
        Ok(Self(raw))
    }

    /// Validates an optional raw id as carried by hook parameters.
    pub fn parse(raw: Option<i64>) -> Result<Self, InvalidProductId> {
        let raw = raw.ok_or(InvalidProductId::Missing)?;
        if raw <= 0 {
            return Err(InvalidProductId::NonPositive(raw));
        }
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| InvalidProductId::OutOfRange(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = InvalidProductId;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::parse(Some(raw))
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        i64::from(id.0)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store context a stock level and an active flag apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShopId(pub u32);

impl ShopId {
    pub const DEFAULT: ShopId = ShopId(1);
}

impl Display for ShopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Combination (variant) of a product. `0` addresses the product as a whole.
pub type CombinationId = u32;

/// Total available quantity for a product across all of its combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockLevel(pub i64);

impl StockLevel {
    pub fn get(self) -> i64 {
        self.0
    }

    /// Zero and negative stock both count as sold out.
    pub fn is_depleted(self) -> bool {
        self.0 <= 0
    }
}

impl Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle on a product as loaded by the host, scoped to one shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub active: bool,
}

/// Severity scale of the host log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Kind of object a log record is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectType {
    Module,
    Product,
}

impl Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectType::Module => write!(f, "Module"),
            SubjectType::Product => write!(f, "Product"),
        }
    }
}

/// A record written to the host log. Never read back by the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    pub subject_type: SubjectType,
    pub subject_id: Option<ProductId>,
}

impl LogEntry {
    /// A record about the module itself, with no subject id.
    pub fn module(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            subject_type: SubjectType::Module,
            subject_id: None,
        }
    }

    /// A record about one product.
    pub fn product(severity: Severity, product_id: ProductId, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            subject_type: SubjectType::Product,
            subject_id: Some(product_id),
        }
    }

    /// A record about the module that still names the product involved.
    pub fn module_about(
        severity: Severity,
        product_id: ProductId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: Some(product_id),
            ..Self::module(severity, message)
        }
    }
}

/// Event fired by the host whenever a stock quantity is updated.
///
/// Ids arrive raw and unvalidated, exactly as the host passes them to hook handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuantityChanged {
    pub product_id: Option<i64>,
    pub product_attribute_id: Option<i64>,
    pub shop_id: ShopId,
}

impl StockQuantityChanged {
    pub fn new(product_id: i64, product_attribute_id: i64, shop_id: ShopId) -> Self {
        Self {
            product_id: Some(product_id),
            product_attribute_id: Some(product_attribute_id),
            shop_id,
        }
    }

    /// Combination that triggered the event; `0` when the host omitted it.
    pub fn combination(&self) -> i64 {
        self.product_attribute_id.unwrap_or(0)
    }
}
