//! Integration tests for bucketkey.
//!
//! These tests require an AWS-compatible server with S3 and IAM at
//! `localhost:4566` (or `BUCKETKEY_TEST_ENDPOINT`). They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p bucketkey-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use bucketkey_aws::sdk::{SdkIdentityApi, SdkStorageApi};

static INIT: Once = Once::new();

/// Region the test clients are bound to.
pub const TEST_REGION: &str = "us-east-1";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("BUCKETKEY_TEST_ENDPOINT").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

fn test_credentials() -> Credentials {
    Credentials::new("test", "test", None, None, "integration-test")
}

/// S3 API pointing at the local server.
#[must_use]
pub fn storage_api() -> SdkStorageApi {
    init_tracing();

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(test_credentials())
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    SdkStorageApi::new(aws_sdk_s3::Client::from_conf(config))
}

/// IAM API pointing at the local server.
#[must_use]
pub fn identity_api() -> SdkIdentityApi {
    init_tracing();

    let config = aws_sdk_iam::config::Builder::new()
        .behavior_version(aws_sdk_iam::config::BehaviorVersion::latest())
        .region(aws_sdk_iam::config::Region::new(TEST_REGION))
        .credentials_provider(test_credentials())
        .endpoint_url(endpoint_url())
        .build();

    SdkIdentityApi::new(aws_sdk_iam::Client::from_conf(config))
}

/// Generate a unique run name for a test.
#[must_use]
pub fn test_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_bucket;
mod test_identity;
mod test_provision;
