//! [`StorageApi`] and [`IdentityApi`] over the AWS SDK.
//!
//! Credentials come from the SDK's default provider chain (environment,
//! shared profile, IMDS, ...); region, profile, and endpoint are taken from
//! [`BucketKeyConfig`] rather than ambient process state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::interceptors::context::BeforeDeserializationInterceptorContextRef;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;
use bucketkey_core::{AwsRegion, BucketKeyConfig, BucketName, SecretKey};
use tracing::debug;

use crate::api::{
    AccessKeyPair, BucketCreated, CreatedPolicy, CreatedUser, IdentityApi, StorageApi,
};
use crate::error::ApiError;

/// Load the shared SDK configuration for `config`.
pub async fn load_sdk_config(config: &BucketKeyConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.as_str().to_owned()));

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    debug!(
        region = %config.region,
        endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
        profile = config.profile.as_deref().unwrap_or("default"),
        "loaded AWS SDK configuration"
    );
    sdk_config
}

/// Records the HTTP status of the response it observes.
#[derive(Debug, Clone, Default)]
struct StatusRecorder(Arc<AtomicU16>);

impl StatusRecorder {
    fn status(&self) -> u16 {
        self.0.load(Ordering::Acquire)
    }
}

impl Intercept for StatusRecorder {
    fn name(&self) -> &'static str {
        "StatusRecorder"
    }

    fn read_after_transmit(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.0
            .store(context.response().status().as_u16(), Ordering::Release);
        Ok(())
    }
}

/// [`StorageApi`] backed by `aws-sdk-s3`.
#[derive(Debug, Clone)]
pub struct SdkStorageApi {
    client: aws_sdk_s3::Client,
}

impl SdkStorageApi {
    /// Wrap an existing S3 client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build an S3 client from shared configuration.
    #[must_use]
    pub fn from_sdk_config(sdk_config: &SdkConfig, force_path_style: bool) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(force_path_style)
            .build();
        Self::new(aws_sdk_s3::Client::from_conf(s3_config))
    }
}

#[async_trait]
impl StorageApi for SdkStorageApi {
    async fn create_bucket(
        &self,
        bucket: &BucketName,
        region: &AwsRegion,
    ) -> Result<BucketCreated, ApiError> {
        let mut request = self.client.create_bucket().bucket(bucket.as_str());
        if region.needs_location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region.as_str()))
                    .build(),
            );
        }

        let recorder = StatusRecorder::default();
        let output = request
            .customize()
            .interceptor(recorder.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_sdk("CreateBucket", &e))?;

        Ok(BucketCreated {
            status: recorder.status(),
            location: output.location().map(ToOwned::to_owned),
        })
    }
}

/// [`IdentityApi`] backed by `aws-sdk-iam`.
#[derive(Debug, Clone)]
pub struct SdkIdentityApi {
    client: aws_sdk_iam::Client,
}

impl SdkIdentityApi {
    /// Wrap an existing IAM client.
    #[must_use]
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }

    /// Build an IAM client from shared configuration.
    #[must_use]
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(aws_sdk_iam::Client::new(sdk_config))
    }
}

#[async_trait]
impl IdentityApi for SdkIdentityApi {
    async fn create_user(&self, user_name: &str) -> Result<CreatedUser, ApiError> {
        let output = self
            .client
            .create_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk("CreateUser", &e))?;

        let user = output
            .user()
            .ok_or_else(|| ApiError::missing_field("CreateUser", "User"))?;
        Ok(CreatedUser {
            user_name: user.user_name().to_owned(),
            arn: user.arn().to_owned(),
        })
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<CreatedPolicy, ApiError> {
        let output = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk("CreatePolicy", &e))?;

        let arn = output
            .policy()
            .and_then(|p| p.arn())
            .ok_or_else(|| ApiError::missing_field("CreatePolicy", "Policy.Arn"))?;
        Ok(CreatedPolicy {
            arn: arn.to_owned(),
        })
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> Result<(), ApiError> {
        self.client
            .attach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk("AttachUserPolicy", &e))?;
        Ok(())
    }

    async fn create_access_key(&self, user_name: &str) -> Result<AccessKeyPair, ApiError> {
        let output = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk("CreateAccessKey", &e))?;

        let key = output
            .access_key()
            .ok_or_else(|| ApiError::missing_field("CreateAccessKey", "AccessKey"))?;
        Ok(AccessKeyPair {
            access_key_id: key.access_key_id().to_owned(),
            secret_access_key: SecretKey::new(key.secret_access_key()),
        })
    }
}
