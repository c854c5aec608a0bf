//! Dataset domains served by the backend.
//!
//! Every fetch is scoped to exactly one domain; the backend keeps a separate
//! pipeline per domain and the wire value rides along as a query parameter
//! (GET) or request-body field (POST).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainId {
    Telecom,
    Bank,
    Ecommerce,
}

impl DomainId {
    pub const ALL: [DomainId; 3] = [DomainId::Telecom, DomainId::Bank, DomainId::Ecommerce];

    /// Wire value used in query strings and request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            DomainId::Telecom => "telecom",
            DomainId::Bank => "bank",
            DomainId::Ecommerce => "ecommerce",
        }
    }

    /// Human-facing label for reports and the domain selector.
    pub fn label(self) -> &'static str {
        match self {
            DomainId::Telecom => "Telecom",
            DomainId::Bank => "Banking",
            DomainId::Ecommerce => "E-Commerce",
        }
    }

    /// Parses a wire value; unknown strings yield None rather than a guess.
    pub fn parse(s: &str) -> Option<DomainId> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telecom" => Some(DomainId::Telecom),
            "bank" => Some(DomainId::Bank),
            "ecommerce" => Some(DomainId::Ecommerce),
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
