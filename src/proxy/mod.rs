// Outbound lookups against external services

pub mod github;

pub use github::{GithubClient, RepoLookup};
