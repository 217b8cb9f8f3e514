//! Core types, configuration, and policy handling for bucketkey.
//!
//! This crate holds everything the provisioning flow needs that does not
//! talk to AWS: the runtime configuration, the bucket/identity naming
//! rules, the policy template and its resource injection, and the result
//! record persisted at the end of a run.

mod config;
mod error;
pub mod policy;
pub mod record;
mod types;
pub mod validation;

pub use config::BucketKeyConfig;
pub use error::{BucketKeyError, BucketKeyResult};
pub use policy::PolicyDocument;
pub use record::ResultRecord;
pub use types::{AwsRegion, BucketName, SecretKey, bucket_arn};
