use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome pages the browser lands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomePages {
    pub success: String,
    pub failed: String,
    pub cancelled: String,
}

impl Default for OutcomePages {
    fn default() -> Self {
        Self {
            success: "/payment/success".into(),
            failed: "/payment/failed".into(),
            cancelled: "/payment/cancelled".into(),
        }
    }
}

/// HTTP method the callback arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMethod {
    Post,
    Get,
}

impl InboundMethod {
    /// Anything other than POST is answered like a GET.
    pub fn from_name(method: &str) -> Self {
        if method.eq_ignore_ascii_case("POST") {
            Self::Post
        } else {
            Self::Get
        }
    }
}

/// Redirect flavour sent back to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectStatus {
    /// 303: the follow-up request is always a GET.
    SeeOther,
    /// 307: plain temporary redirect.
    Temporary,
}

impl RedirectStatus {
    pub fn for_method(method: InboundMethod) -> Self {
        match method {
            InboundMethod::Post => Self::SeeOther,
            InboundMethod::Get => Self::Temporary,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::SeeOther => 303,
            Self::Temporary => 307,
        }
    }
}

/// A page path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RedirectTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Append `key=value` only when a value is present.
    pub fn with_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path with a percent-encoded query string.
    pub fn to_uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// A redirect decision: where to and with which status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub target: RedirectTarget,
    pub status: RedirectStatus,
}
