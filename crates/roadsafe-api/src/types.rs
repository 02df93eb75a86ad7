use chrono::{DateTime, Utc};
use roadsafe_core::{Money, Subject, SubjectType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEBT_PAYMENT_PATH: &str = "/api/payments/process-debt-payment";
pub const FINE_PAYMENT_PATH: &str = "/api/payments/process-fine-payment";
pub const DEBTS_PATH: &str = "/api/debts";
pub const FINES_PATH: &str = "/api/fines";
pub const REWARDS_PATH: &str = "/api/rewards";
pub const VEHICLES_PATH: &str = "/api/vehicles";
pub const LICENSES_PATH: &str = "/api/licenses";

/// Request asking the backend to mark a debt or fine as paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    pub subject: Subject,
    pub transaction_id: String,
    pub amount: Option<Money>,
    pub validation_id: Option<String>,
}

impl SettlementRequest {
    /// Backend endpoint for this subject type.
    pub fn path(&self) -> &'static str {
        match self.subject.kind {
            SubjectType::Debt => DEBT_PAYMENT_PATH,
            SubjectType::Fine => FINE_PAYMENT_PATH,
        }
    }

    /// JSON body: `{ debtId|fineId, transactionId, amount, valId }`.
    ///
    /// `amount` and `valId` are omitted when the gateway did not supply them.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            self.subject.kind.id_param().to_string(),
            Value::String(self.subject.id.clone()),
        );
        body.insert(
            "transactionId".to_string(),
            Value::String(self.transaction_id.clone()),
        );
        if let Some(amount) = self.amount {
            body.insert(
                "amount".to_string(),
                serde_json::to_value(amount).unwrap_or(Value::Null),
            );
        }
        if let Some(ref val_id) = self.validation_id {
            body.insert("valId".to_string(), Value::String(val_id.clone()));
        }
        Value::Object(body)
    }
}

/// Backend acknowledgment of a settlement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

/// A reward earned for safe driving or reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub amount: Money,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A vehicle registered to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Payload for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub registration_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A driving license held by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub license_number: String,
    #[serde(default)]
    pub class: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl License {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subject: Subject) -> SettlementRequest {
        SettlementRequest {
            subject,
            transaction_id: "T1".into(),
            amount: Some(Money::from_major(500).unwrap()),
            validation_id: None,
        }
    }

    #[test]
    fn test_debt_settlement_body() {
        let req = request(Subject::debt("D1"));
        assert_eq!(req.path(), DEBT_PAYMENT_PATH);
        assert_eq!(
            req.body(),
            serde_json::json!({"debtId": "D1", "transactionId": "T1", "amount": 500})
        );
    }

    #[test]
    fn test_fine_settlement_body_with_val_id() {
        let mut req = request(Subject::fine("F9"));
        req.validation_id = Some("V77".into());
        req.amount = None;
        assert_eq!(req.path(), FINE_PAYMENT_PATH);
        assert_eq!(
            req.body(),
            serde_json::json!({"fineId": "F9", "transactionId": "T1", "valId": "V77"})
        );
    }

    #[test]
    fn test_ack_without_message() {
        let ack: SettlementAck = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(ack.success);
        assert!(ack.message.is_none());
    }

    #[test]
    fn test_page_decodes() {
        let page: Page<Vehicle> = serde_json::from_value(serde_json::json!({
            "items": [{"id": "V1", "registrationNumber": "DHA-11-2233"}],
            "page": 1,
            "totalPages": 3
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 0);
    }
}
