//! # agol-aws
//!
//! AWS implementations of the storage and secret traits from `agol-core`.
//!
//! The SDK is async; each client owns a current-thread tokio runtime and
//! blocks on it so callers stay fully synchronous.

mod runtime;
pub mod s3;
pub mod secrets;

pub use s3::S3Store;
pub use secrets::{SecretsManagerStore, DEFAULT_SECRETS_REGION};
