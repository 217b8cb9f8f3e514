//! The API seams the clients are written against.
//!
//! [`StorageApi`] and [`IdentityApi`] cover exactly the calls the
//! provisioning flow makes. [`crate::sdk`] implements them over the AWS SDK;
//! tests implement them in memory.

use async_trait::async_trait;
use bucketkey_core::{AwsRegion, BucketName, SecretKey};

use crate::error::ApiError;

/// Result of a successful `CreateBucket` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketCreated {
    /// HTTP status the service answered with.
    pub status: u16,
    /// `Location` header returned by the service.
    pub location: Option<String>,
}

/// Result of a successful `CreateUser` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    /// Name of the user as reported by IAM.
    pub user_name: String,
    /// ARN of the user.
    pub arn: String,
}

/// Result of a successful `CreatePolicy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPolicy {
    /// ARN of the managed policy.
    pub arn: String,
}

/// A freshly minted access key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyPair {
    /// Public access key ID.
    pub access_key_id: String,
    /// Secret access key. Only ever visible in the creation response.
    pub secret_access_key: SecretKey,
}

/// Object storage operations.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Create `bucket` in `region`.
    async fn create_bucket(
        &self,
        bucket: &BucketName,
        region: &AwsRegion,
    ) -> Result<BucketCreated, ApiError>;
}

/// Identity and access management operations.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Create an IAM user.
    async fn create_user(&self, user_name: &str) -> Result<CreatedUser, ApiError>;

    /// Register a customer managed policy.
    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<CreatedPolicy, ApiError>;

    /// Attach a managed policy to a user.
    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<(), ApiError>;

    /// Generate an access key pair for a user.
    async fn create_access_key(&self, user_name: &str) -> Result<AccessKeyPair, ApiError>;
}
