use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Minor units per major unit (two decimal places).
pub const MINOR_PER_MAJOR: u64 = 100;

/// A non-negative currency amount held in integer minor units.
///
/// Serialized as a JSON number in major units (`500` or `500.5`), which is
/// the shape the backend expects. Deserializes from a number or a numeric
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create from minor units (cents, paisa).
    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Create from whole major units.
    pub fn from_major(major: u64) -> Result<Self, CoreError> {
        major
            .checked_mul(MINOR_PER_MAJOR)
            .map(Self)
            .ok_or(CoreError::Overflow)
    }

    /// Value in minor units.
    pub fn minor(&self) -> u64 {
        self.0
    }

    /// Whole major units, truncating the fraction.
    pub fn major(&self) -> u64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Fractional part in minor units.
    pub fn fraction(&self) -> u64 {
        self.0 % MINOR_PER_MAJOR
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Parse a decimal string such as `"500"`, `"500.5"` or `"500.50"`.
    ///
    /// Digits past the second decimal place round half-up.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CoreError::InvalidAmount("empty amount".into()));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(CoreError::InvalidAmount(format!("not a decimal amount: {}", input)));
        }

        let whole: u64 = whole
            .parse()
            .map_err(|_| CoreError::InvalidAmount(format!("amount out of range: {}", input)))?;

        // Two digits make the minor part; the next one decides rounding.
        let digit = |i: usize| frac.as_bytes().get(i).map_or(0, |b| u64::from(b - b'0'));
        let mut frac_minor = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            frac_minor += 1;
        }

        Self::from_major(whole)?
            .checked_add(Money(frac_minor))
            .ok_or(CoreError::Overflow)
    }

    /// Convert a floating-point major amount, rounding to the nearest minor unit.
    pub fn from_major_f64(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidAmount(format!("{}", value)));
        }
        let minor = (value * MINOR_PER_MAJOR as f64).round();
        if minor > u64::MAX as f64 {
            return Err(CoreError::Overflow);
        }
        Ok(Self(minor as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major(), self.fraction())
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.fraction() == 0 {
            serializer.serialize_u64(self.major())
        } else {
            serializer.serialize_f64(self.0 as f64 / MINOR_PER_MAJOR as f64)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Float(f64),
            Text(String),
        }

        let money = match Raw::deserialize(deserializer)? {
            Raw::Int(major) => Money::from_major(major),
            Raw::Float(value) => Money::from_major_f64(value),
            Raw::Text(text) => Money::parse(&text),
        };
        money.map_err(serde::de::Error::custom)
    }
}

/// Which domain object a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Debt,
    Fine,
}

impl SubjectType {
    /// Wire name used in the `type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Fine => "fine",
        }
    }

    /// Name of the parameter that carries the subject identifier.
    pub fn id_param(&self) -> &'static str {
        match self {
            Self::Debt => "debtId",
            Self::Fine => "fineId",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debt" => Ok(Self::Debt),
            "fine" => Ok(Self::Fine),
            other => Err(CoreError::UnknownSubjectType(other.to_string())),
        }
    }
}

/// A settlement subject: the debt or fine a payment targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectType,
    pub id: String,
}

impl Subject {
    pub fn new(kind: SubjectType, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn debt(id: impl Into<String>) -> Self {
        Self::new(SubjectType::Debt, id)
    }

    pub fn fine(id: impl Into<String>) -> Self {
        Self::new(SubjectType::Fine, id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Payment status of a debt or fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiabilityStatus {
    Unpaid,
    Paid,
}

/// Anything that carries a principal, a due date, and a paid flag, and so
/// accrues late fees.
pub trait Liability {
    fn principal(&self) -> Money;
    fn due_date(&self) -> DateTime<Utc>;
    fn status(&self) -> LiabilityStatus;

    fn is_unpaid(&self) -> bool {
        self.status() == LiabilityStatus::Unpaid
    }
}

/// An outstanding debt owed to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub principal: Money,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: LiabilityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Liability for Debt {
    fn principal(&self) -> Money {
        self.principal
    }

    fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    fn status(&self) -> LiabilityStatus {
        self.status
    }
}

/// A traffic fine issued against a vehicle or driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
    pub id: String,
    pub amount: Money,
    pub due_date: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub status: LiabilityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Liability for Fine {
    fn principal(&self) -> Money {
        self.amount
    }

    fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    fn status(&self) -> LiabilityStatus {
        self.status
    }
}

/// Outcome reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayStatus {
    Valid,
    Failed,
    Cancelled,
    Other(String),
}

impl GatewayStatus {
    /// Exact, case-sensitive match on the gateway's status word.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "VALID" => Self::Valid,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "VALID"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A single payment attempt as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    /// Gateway transaction identifier (`tran_id`).
    pub transaction_id: String,
    /// Gateway validation identifier (`val_id`).
    pub validation_id: Option<String>,
    /// Charged amount, if the gateway reported one that parses.
    pub amount: Option<Money>,
    pub status: GatewayStatus,
    pub subject: Subject,
}
