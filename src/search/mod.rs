pub mod github;

pub use github::GitHubSearchClient;
