//! Common type definitions shared across the provisioning flow.

use std::fmt;

use crate::error::BucketKeyResult;
use crate::validation::validate_bucket_name;

const S3_ARN_PREFIX: &str = "arn:aws:s3:::";

/// The ARN of the bucket called `name`. The name is not validated.
///
/// ```
/// assert_eq!(bucketkey_core::bucket_arn("foo"), "arn:aws:s3:::foo");
/// ```
#[must_use]
pub fn bucket_arn(name: &str) -> String {
    format!("{S3_ARN_PREFIX}{name}")
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Region buckets are created in unless configured otherwise.
    pub const DEFAULT: &str = "ap-northeast-1";

    /// The one region where S3 rejects an explicit location constraint.
    pub const US_EAST_1: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `CreateBucket` needs a location constraint for this region.
    #[must_use]
    pub fn needs_location_constraint(&self) -> bool {
        self.0 != Self::US_EAST_1
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bucket name that passed S3 naming validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    /// Validate and wrap a bucket name.
    ///
    /// # Errors
    /// Returns [`crate::BucketKeyError::InvalidName`] if the name breaks S3 naming rules.
    pub fn new(name: impl Into<String>) -> BucketKeyResult<Self> {
        let name = name.into();
        validate_bucket_name(&name)?;
        Ok(Self(name))
    }

    /// Get the bucket name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A secret access key.
///
/// `Debug` and `Display` only show a masked form; the raw value is reachable
/// through [`SecretKey::expose`] and is what gets serialized into the state file.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Number of leading characters left visible when masking.
    const VISIBLE_PREFIX: usize = 4;

    /// Wrap a raw secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The secret with everything past the first few characters replaced by `*`.
    #[must_use]
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(Self::VISIBLE_PREFIX).collect();
        let hidden = self.0.chars().count().saturating_sub(Self::VISIBLE_PREFIX);
        format!("{visible}{}", "*".repeat(hidden))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
