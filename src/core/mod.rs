pub mod candidate;
pub mod config;
pub mod error;
pub mod outcome;
pub mod traits;
pub mod types;

pub use candidate::{ApiKeyCandidate, SearchOrigin};
pub use config::Config;
pub use error::{LeakwatchError, Result};
pub use outcome::{KeyMetadata, OutcomeKind, ValidationOutcome};
pub use traits::{
    ApiKeyProvider, CandidateStore, ClaimRequest, ProviderDescriptor, SearchClient, SearchHit,
    UpsertOutcome, VerificationUpdate,
};
pub use types::{ApiType, KeyStatus, ProviderCategory, SearchSource};
