pub mod engine;

pub use engine::{bump_error, fold_outcome, StatusFold, Verifier, VerifyStats};
