//! Value objects for the order domain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderError;

/// Tax rate applied to every order, in percent.
pub(crate) const TAX_RATE_PERCENT: i64 = 16;

/// Unique identifier for the client (customer) placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a client ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for the vendor fulfilling an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(Uuid);

impl VendorId {
    /// Creates a new random vendor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a vendor ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stock-keeping unit identifier for a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(String);

impl SkuId {
    /// Creates a new SKU ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the SKU ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the SKU ID is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SkuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SkuId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SkuId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SkuId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Returns the given percentage of this amount, truncating toward zero.
    pub fn percent(&self, pct: i64) -> Money {
        Money {
            cents: self.cents * pct / 100,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

/// An item in an order.
///
/// Two items with the same SKU never coexist in one order; adding a
/// duplicate SKU merges quantities on the aggregate instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The stock-keeping unit being ordered.
    pub sku: SkuId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit in cents.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item, validating its fields.
    pub fn new(
        sku: impl Into<SkuId>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        let sku = sku.into();
        if sku.is_empty() {
            return Err(OrderError::EmptySku);
        }
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        if unit_price.is_negative() {
            return Err(OrderError::NegativePrice {
                cents: unit_price.cents(),
            });
        }
        Ok(Self {
            sku,
            quantity,
            unit_price,
        })
    }

    /// Returns the subtotal for this item (quantity * unit_price).
    ///
    /// Derived, never stored independently.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Estimated time of arrival: a date plus a tolerance window in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eta {
    /// Expected arrival date.
    pub date: NaiveDate,

    /// Tolerance window in minutes.
    pub window_minutes: u32,
}

impl Eta {
    /// Creates a new ETA.
    pub fn new(date: NaiveDate, window_minutes: u32) -> Self {
        Self {
            date,
            window_minutes,
        }
    }
}

/// Derived order totals, always recomputed from the current items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderTotals {
    /// Sum of item subtotals.
    pub subtotal: Money,

    /// Tax at 16% of the subtotal.
    pub tax: Money,

    /// Shipping cost (reserved, currently always zero).
    pub shipping: Money,

    /// subtotal + tax + shipping.
    pub grand_total: Money,
}

impl OrderTotals {
    /// Recomputes totals from a slice of items.
    pub fn from_items(items: &[OrderItem]) -> Self {
        let subtotal = items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.subtotal());
        let tax = subtotal.percent(TAX_RATE_PERCENT);
        let shipping = Money::zero();
        Self {
            subtotal,
            tax,
            shipping,
            grand_total: subtotal + tax + shipping,
        }
    }
}

/// Delivery metadata attached to an order.
///
/// Every field is independently nullable and independently updatable;
/// `merge` applies only the fields that are present on the patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeliveryDetails {
    /// Free-text delivery address.
    pub address: Option<String>,

    /// Scheduled delivery date.
    pub date: Option<NaiveDate>,

    /// Name of the receiving contact.
    pub contact_name: Option<String>,

    /// Phone number of the receiving contact.
    pub contact_phone: Option<String>,

    /// Free-text delivery notes.
    pub notes: Option<String>,

    /// Identifier of the assigned delivery route.
    pub route_id: Option<String>,
}

impl DeliveryDetails {
    /// Applies the populated fields of `patch` over this value.
    pub fn merge(&mut self, patch: DeliveryDetails) {
        if patch.address.is_some() {
            self.address = patch.address;
        }
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if patch.contact_name.is_some() {
            self.contact_name = patch.contact_name;
        }
        if patch.contact_phone.is_some() {
            self.contact_phone = patch.contact_phone;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
        if patch.route_id.is_some() {
            self.route_id = patch.route_id;
        }
    }

    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.date.is_none()
            && self.contact_name.is_none()
            && self.contact_phone.is_none()
            && self.notes.is_none()
            && self.route_id.is_none()
    }
}
