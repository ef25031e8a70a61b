use serde::{Deserialize, Serialize};

/// The closed outcome taxonomy every provider probe maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The credential authenticated.
    Success,
    /// The provider rejected the credential.
    Unauthorized,
    /// Authenticated but currently unusable: quota exhausted, rate limited,
    /// or insufficiently scoped. Distinct from `Unauthorized` on purpose;
    /// these keys are live.
    ValidNoCredits,
    /// Cannot be validated for structural reasons (paired secret, tenant
    /// endpoint, region). Returned defensively by unverifiable providers.
    ProviderSpecificError,
    /// Unexpected HTTP status the provider's classifier has no rule for.
    HttpError,
}

/// Metadata extracted from a successful probe (scopes, account type, plan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl KeyMetadata {
    pub fn new(name: &str, label: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Result of one live probe. Transient: the verification engine folds it into
/// the candidate's persisted status, it is never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub kind: OutcomeKind,
    pub http_status: Option<u16>,
    pub detail: Option<String>,
    pub metadata: Vec<KeyMetadata>,
}

impl ValidationOutcome {
    pub fn success(http_status: u16) -> Self {
        Self {
            kind: OutcomeKind::Success,
            http_status: Some(http_status),
            detail: None,
            metadata: Vec::new(),
        }
    }

    pub fn success_with(http_status: u16, metadata: Vec<KeyMetadata>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            http_status: Some(http_status),
            detail: None,
            metadata,
        }
    }

    pub fn unauthorized(http_status: u16) -> Self {
        Self {
            kind: OutcomeKind::Unauthorized,
            http_status: Some(http_status),
            detail: None,
            metadata: Vec::new(),
        }
    }

    pub fn unauthorized_with(http_status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Unauthorized,
            http_status: Some(http_status),
            detail: Some(detail.into()),
            metadata: Vec::new(),
        }
    }

    pub fn valid_no_credits(http_status: u16) -> Self {
        Self {
            kind: OutcomeKind::ValidNoCredits,
            http_status: Some(http_status),
            detail: None,
            metadata: Vec::new(),
        }
    }

    pub fn provider_specific(detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::ProviderSpecificError,
            http_status: None,
            detail: Some(detail.into()),
            metadata: Vec::new(),
        }
    }

    pub fn http_error(http_status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::HttpError,
            http_status: Some(http_status),
            detail: Some(detail.into()),
            metadata: Vec::new(),
        }
    }

    /// Whether the probe proved the credential authenticates.
    pub fn is_live(&self) -> bool {
        matches!(self.kind, OutcomeKind::Success | OutcomeKind::ValidNoCredits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind_and_status() {
        assert_eq!(ValidationOutcome::success(200).kind, OutcomeKind::Success);
        assert_eq!(ValidationOutcome::unauthorized(401).http_status, Some(401));
        assert_eq!(
            ValidationOutcome::provider_specific("needs paired secret").http_status,
            None
        );
    }

    #[test]
    fn test_liveness() {
        assert!(ValidationOutcome::success(200).is_live());
        assert!(ValidationOutcome::valid_no_credits(429).is_live());
        assert!(!ValidationOutcome::unauthorized(401).is_live());
        assert!(!ValidationOutcome::http_error(500, "boom").is_live());
    }
}
