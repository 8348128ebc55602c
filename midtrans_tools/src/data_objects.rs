use serde::{Deserialize, Serialize};

//--------------------------------------   Charge request    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub payment_type: String,
    pub transaction_details: TransactionDetails,
    pub bank_transfer: BankTransfer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransfer {
    pub bank: String,
}

impl ChargeRequest {
    pub fn bank_transfer(order_id: impl Into<String>, gross_amount: i64, bank: impl Into<String>) -> Self {
        Self {
            payment_type: "bank_transfer".to_string(),
            transaction_details: TransactionDetails { order_id: order_id.into(), gross_amount },
            bank_transfer: BankTransfer { bank: bank.into() },
        }
    }
}

//--------------------------------------   Charge response   ---------------------------------------------------------
/// Midtrans answers most requests with HTTP 200 and reports the real outcome in `status_code`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeResponse {
    pub status_code: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
    #[serde(default)]
    pub permata_va_number: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub method: Option<String>,
    pub url: String,
}

impl ChargeResponse {
    pub fn status_code(&self) -> Option<u16> {
        self.status_code.trim().parse().ok()
    }

    /// The virtual account the payer should transfer to. Permata charges report it in a dedicated field.
    pub fn virtual_account(&self) -> Option<VaNumber> {
        self.va_numbers.first().cloned().or_else(|| {
            self.permata_va_number
                .as_ref()
                .map(|va_number| VaNumber { bank: "permata".to_string(), va_number: va_number.clone() })
        })
    }

    pub fn payment_url(&self) -> Option<String> {
        self.actions.first().map(|a| a.url.clone())
    }
}

//--------------------------------------    Notification     ---------------------------------------------------------
/// The HTTP notification Midtrans posts when a transaction changes state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidtransNotification {
    pub order_id: String,
    pub status_code: String,
    /// Decimal string, e.g. "50000.00"
    pub gross_amount: String,
    pub transaction_status: String,
    pub signature_key: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
}

impl MidtransNotification {
    /// The status string to feed into status mapping. Card captures carry the fraud verdict separately, and a capture
    /// is only final once fraud screening has accepted it.
    pub fn effective_status(&self) -> String {
        match (self.transaction_status.as_str(), self.fraud_status.as_deref()) {
            ("capture", Some("challenge")) => "challenge".to_string(),
            ("capture", Some("deny")) => "deny".to_string(),
            (status, _) => status.to_string(),
        }
    }
}
