use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use doakan_common::Rupiah;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Donor,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Donor => write!(f, "donor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" | "user" => Ok(Self::Donor),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn new<S: Into<String>>(name: S, email: S) -> Self {
        Self { name: name.into(), email: email.into(), role: Role::Donor }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

//--------------------------------------      Donation       ---------------------------------------------------------
/// A donation campaign. `collected_amount` and `donor_count` are aggregates over the campaign's settled transactions.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    /// The campaign owner
    pub user_id: i64,
    pub title: String,
    pub target_amount: Rupiah,
    pub collected_amount: Rupiah,
    pub donor_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: i64,
    pub title: String,
    pub target_amount: Rupiah,
    pub is_active: bool,
}

impl NewDonation {
    pub fn new<S: Into<String>>(user_id: i64, title: S, target_amount: Rupiah) -> Self {
        Self { user_id, title: title.into(), target_amount, is_active: true }
    }

    pub fn closed(mut self) -> Self {
        self.is_active = false;
        self
    }
}

//--------------------------------------    TransactionId    ---------------------------------------------------------
/// The order reference shared with the payment gateway. It is also the transaction's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// Mints a fresh reference of the form `DKN-20240501093000-0a1b2c3d`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix: u32 = rand::thread_rng().gen();
        Self(format!("DKN-{}-{suffix:08x}", now.format("%Y%m%d%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransactionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------  TransactionStatus  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Charge created, waiting for the payer to transfer the funds.
    #[default]
    Pending,
    /// Funds received. Counted towards the campaign's collected amount.
    Settled,
    /// The payer did not complete the transfer in time.
    Expired,
    Cancelled,
    /// Denied by the gateway or its fraud screening.
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only `pending` transactions move, and only into a terminal state.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        *self == Self::Pending && next.is_terminal()
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Settled => write!(f, "settled"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------     Transaction     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub donation_id: i64,
    pub user_id: i64,
    pub amount: Rupiah,
    pub status: TransactionStatus,
    pub va_number: String,
    pub bank: String,
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A transaction ready to be stored. The gateway charge has already been created at this point, so the payment
/// instructions are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub id: TransactionId,
    pub donation_id: i64,
    pub user_id: i64,
    pub amount: Rupiah,
    pub va_number: String,
    pub bank: String,
    pub payment_url: Option<String>,
}
