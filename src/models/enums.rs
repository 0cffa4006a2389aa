//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Availability of a physical copy.
///
/// Stored as a one-letter code. Any status may be changed to any other;
/// there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// Storage code
    pub fn code(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        LoanStatus::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error for a status code outside the enumeration
#[derive(Debug, thiserror::Error)]
#[error("invalid loan status code '{0}'")]
pub struct InvalidLoanStatus(pub String);

impl TryFrom<String> for LoanStatus {
    type Error = InvalidLoanStatus;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        LoanStatus::from_code(code.trim()).ok_or(InvalidLoanStatus(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::default().code(), "m");
    }

    #[test]
    fn codes_are_the_four_storage_letters() {
        let codes: Vec<_> = LoanStatus::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, ["m", "o", "a", "r"]);
        for status in LoanStatus::ALL {
            assert_eq!(LoanStatus::try_from(status.code().to_string()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(LoanStatus::try_from("x".to_string()).is_err());
        assert!(LoanStatus::try_from(String::new()).is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(LoanStatus::OnLoan.to_string(), "On loan");
        assert_eq!(LoanStatus::Reserved.label(), "Reserved");
    }

    #[test]
    fn json_uses_snake_case_names() {
        assert_eq!(serde_json::to_string(&LoanStatus::OnLoan).unwrap(), "\"on_loan\"");
        let parsed: LoanStatus = serde_json::from_str("\"available\"").unwrap();
        assert_eq!(parsed, LoanStatus::Available);
    }
}
