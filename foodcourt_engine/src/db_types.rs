use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fcs_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(pub &'static str, pub String);

//--------------------------------------     OrderNumber     ---------------------------------------------------------
/// The human-readable, globally unique number printed on receipts and called out at counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       GroupId       ---------------------------------------------------------
/// Correlation id shared by sibling orders created from one multi-seller checkout.
///
/// Single-seller checkouts carry no group id. Orders sharing a group id were created in the same materialization
/// call and, when pre-paid, share the same payment source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct GroupId(pub String);

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for GroupId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
/// The order lifecycle. Forward transitions are staff-triggered and strictly adjacent; `Served` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// Created, payment not yet received (pay-later path).
    Pending,
    /// Payment received, not yet being prepared.
    Paid,
    /// The kitchen is working on the order.
    Preparing,
    /// Ready for collection.
    Ready,
    /// Handed over to the guest. Terminal.
    Served,
    /// Cancelled by staff, or automatically when the last line is removed. Terminal.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Served | OrderStatusType::Cancelled)
    }

    /// The next state in the forward progression, if any.
    pub fn next(&self) -> Option<OrderStatusType> {
        use OrderStatusType::*;
        match self {
            Pending => Some(Paid),
            Paid => Some(Preparing),
            Preparing => Some(Ready),
            Ready => Some(Served),
            Served | Cancelled => None,
        }
    }

    /// Orders can only be cancelled before the kitchen starts on them.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatusType::Pending | OrderStatusType::Paid)
    }

    /// Line mutations are only allowed pre-fulfilment.
    pub fn is_modifiable(&self) -> bool {
        matches!(self, OrderStatusType::Pending | OrderStatusType::Paid)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "Pending",
            OrderStatusType::Paid => "Paid",
            OrderStatusType::Preparing => "Preparing",
            OrderStatusType::Ready => "Ready",
            OrderStatusType::Served => "Served",
            OrderStatusType::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Preparing" => Ok(Self::Preparing),
            "Ready" => Ok(Self::Ready),
            "Served" => Ok(Self::Served),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError("order status", s.to_string())),
        }
    }
}

//--------------------------------------    PaymentStatus    ---------------------------------------------------------
/// Whether the guest's money has been received. Only ever moves from `Unpaid` to `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Verified gateway payment (pre-pay path).
    Online,
    /// Settled at the counter (pay-later path default).
    Cash,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online => write!(f, "Online"),
            PaymentMethod::Cash => write!(f, "Cash"),
        }
    }
}

//--------------------------------------   FulfilmentType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum FulfilmentType {
    DineIn,
    Takeaway,
}

impl Display for FulfilmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfilmentType::DineIn => write!(f, "DineIn"),
            FulfilmentType::Takeaway => write!(f, "Takeaway"),
        }
    }
}

impl FromStr for FulfilmentType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DineIn" => Ok(Self::DineIn),
            "Takeaway" => Ok(Self::Takeaway),
            s => Err(ConversionError("fulfilment type", s.to_string())),
        }
    }
}

//--------------------------------------    TransferStatus   ---------------------------------------------------------
/// The outcome of the (single) automated transfer attempt for an order.
///
/// `NotAttempted` and `Failed` are deliberately distinct: the former means the seller has no linked payout account,
/// the latter means the transfer was tried and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransferStatus {
    NotAttempted,
    Success,
    Failed,
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::NotAttempted => write!(f, "NotAttempted"),
            TransferStatus::Success => write!(f, "Success"),
            TransferStatus::Failed => write!(f, "Failed"),
        }
    }
}

//--------------------------------------  SettlementStatus   ---------------------------------------------------------
/// `Pending` covers both "not yet attempted" and "needs manual settlement"; the paired [`TransferStatus`] tells the
/// two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum SettlementStatus {
    Pending,
    Completed,
}

impl Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementStatus::Pending => write!(f, "Pending"),
            SettlementStatus::Completed => write!(f, "Completed"),
        }
    }
}

//--------------------------------------    IntentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum IntentStatus {
    /// Created for a checkout attempt; no orders exist for it yet.
    Created,
    /// Signature verified and orders materialized. A verified intent can never be consumed again.
    Verified,
}

impl Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentStatus::Created => write!(f, "Created"),
            IntentStatus::Verified => write!(f, "Verified"),
        }
    }
}

//--------------------------------------       Seller        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub name: String,
    /// Platform commission as a fraction of the order total. Default 0.10.
    pub commission_rate: f64,
    /// Payout destination at the transfer provider. `None` means settle manually.
    pub payout_account: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      MenuItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub seller_id: i64,
    pub name: String,
    pub price: Money,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      CartLine       ---------------------------------------------------------
/// A client-supplied cart entry. Never persisted as-is; always resolved against the live catalog first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: i64,
    pub quantity: i64,
    pub note: Option<String>,
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub group_id: Option<GroupId>,
    /// The payment intent this order was materialized from (pre-pay path only).
    pub intent_id: Option<String>,
    pub seller_id: i64,
    pub fulfilment: FulfilmentType,
    pub subtotal: Money,
    pub service_charge: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub transfer_id: Option<String>,
    pub transfer_amount: Option<Money>,
    pub commission: Option<Money>,
    pub transfer_status: TransferStatus,
    pub settlement_status: SettlementStatus,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     OrderLine       ---------------------------------------------------------
/// A priced line on an order. `unit_price` and `name` are snapshots taken at materialization time; later catalog
/// edits never alter them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

//--------------------------------------   PaymentIntent     ---------------------------------------------------------
/// A persisted payment intent for one checkout attempt. Creating an intent never creates an order; retried
/// checkouts create a fresh intent rather than reusing this one.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: i64,
    pub intent_id: String,
    pub amount: Money,
    pub currency: String,
    pub item_count: i64,
    pub subtotal: Money,
    pub service_charge: Money,
    pub tax: Money,
    pub status: IntentStatus,
    /// The gateway transaction id this intent was verified against, once consumed.
    pub txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
