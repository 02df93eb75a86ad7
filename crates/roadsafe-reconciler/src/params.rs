//! Normalization of inbound gateway parameters.
//!
//! The gateway reports the same event twice: as a form-encoded POST to the
//! server and as a browser redirect with query parameters. Both are folded
//! into one [`CallbackParams`] map.

use roadsafe_core::{GatewayStatus, Money, PaymentAttempt, Subject, SubjectType};
use std::collections::HashMap;

use crate::error::ReconcileError;

pub const TYPE: &str = "type";
pub const DEBT_ID: &str = "debtId";
pub const FINE_ID: &str = "fineId";
pub const TRAN_ID: &str = "tran_id";
pub const TRANSACTION_ID: &str = "transactionId";
pub const VAL_ID: &str = "val_id";
pub const VAL_ID_ALIAS: &str = "valId";
pub const AMOUNT: &str = "amount";
pub const STATUS: &str = "status";
pub const ERROR: &str = "error";
pub const MESSAGE: &str = "message";

/// Parameters of one inbound callback, query and body merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    values: HashMap<String, String>,
}

impl CallbackParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a query string and a form-encoded body. Body values win.
    pub fn from_parts(query: Option<&str>, body: &[u8]) -> Self {
        let mut params = Self::new();
        if let Some(query) = query {
            params.extend_encoded(query.as_bytes());
        }
        params.extend_encoded(body);
        params
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.insert(k, v);
        }
        params
    }

    fn extend_encoded(&mut self, encoded: &[u8]) {
        for (k, v) in url::form_urlencoded::parse(encoded) {
            self.insert(k.into_owned(), v.into_owned());
        }
    }

    /// Set a value. Blank values are dropped so they read as absent.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.values.insert(key.into(), trimmed.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw `type` value, even if it is not a known subject type.
    pub fn subject_type_raw(&self) -> Option<&str> {
        self.get(TYPE)
    }

    pub fn debt_id(&self) -> Option<&str> {
        self.get(DEBT_ID)
    }

    pub fn fine_id(&self) -> Option<&str> {
        self.get(FINE_ID)
    }

    /// `tran_id`, falling back to `transactionId`.
    pub fn transaction_id(&self) -> Option<&str> {
        self.get(TRAN_ID).or_else(|| self.get(TRANSACTION_ID))
    }

    /// `val_id`, falling back to `valId`.
    pub fn validation_id(&self) -> Option<&str> {
        self.get(VAL_ID).or_else(|| self.get(VAL_ID_ALIAS))
    }

    pub fn status(&self) -> Option<&str> {
        self.get(STATUS)
    }

    pub fn amount_raw(&self) -> Option<&str> {
        self.get(AMOUNT)
    }

    pub fn error(&self) -> Option<&str> {
        self.get(ERROR)
    }

    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE)
    }

    /// The debt or fine named by `type` and its matching id parameter.
    pub fn subject(&self) -> Result<Subject, ReconcileError> {
        let raw = self
            .subject_type_raw()
            .ok_or_else(|| ReconcileError::Malformed("missing type".into()))?;
        let kind: SubjectType = raw
            .parse()
            .map_err(|e: roadsafe_core::CoreError| ReconcileError::Malformed(e.to_string()))?;
        let id = self
            .get(kind.id_param())
            .ok_or_else(|| ReconcileError::Malformed(format!("missing {}", kind.id_param())))?;
        Ok(Subject::new(kind, id))
    }

    /// Build the payment attempt this callback describes.
    ///
    /// Requires subject type, subject id and transaction id. An amount that
    /// does not parse is dropped rather than failing the whole attempt.
    pub fn payment_attempt(&self) -> Result<PaymentAttempt, ReconcileError> {
        let subject = self.subject()?;
        let transaction_id = self
            .transaction_id()
            .ok_or_else(|| ReconcileError::Malformed(format!("missing {}", TRAN_ID)))?;

        let amount = match self.amount_raw() {
            Some(raw) => match gateway_amount(raw) {
                Ok(amount) => Some(amount),
                Err(e) => {
                    tracing::warn!(amount = raw, error = %e, "ignoring unparseable amount");
                    None
                }
            },
            None => None,
        };

        Ok(PaymentAttempt {
            transaction_id: transaction_id.to_string(),
            validation_id: self.validation_id().map(str::to_string),
            amount,
            status: self
                .status()
                .map(GatewayStatus::parse)
                .unwrap_or_else(|| GatewayStatus::Other(String::new())),
            subject,
        })
    }
}

/// Decimal amounts parse exactly; anything else a float parser accepts
/// (`1e3`, `.5`) goes through `f64` and rounds to the nearest minor unit.
fn gateway_amount(raw: &str) -> Result<Money, roadsafe_core::CoreError> {
    Money::parse(raw).or_else(|err| match raw.trim().parse::<f64>() {
        Ok(value) => Money::from_major_f64(value),
        Err(_) => Err(err),
    })
}
