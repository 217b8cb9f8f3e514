//! Bucket creation.

use bucketkey_core::{AwsRegion, BucketName, bucket_arn};
use tracing::{debug, info};

use crate::api::{BucketCreated, StorageApi};
use crate::step::{FailureCause, Step, StepFailure, StepOutcome};

/// The only status `CreateBucket` may answer with for the run to proceed.
const EXPECTED_STATUS: u16 = 200;

/// Creates one bucket and reports its ARN.
#[derive(Debug)]
pub struct StorageClient<A> {
    api: A,
    name: String,
    region: AwsRegion,
}

impl<A: StorageApi> StorageClient<A> {
    /// Create a client for the bucket `name` in `region`.
    pub fn new(api: A, name: impl Into<String>, region: AwsRegion) -> Self {
        Self {
            api,
            name: name.into(),
            region,
        }
    }

    /// The configured bucket name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the bucket.
    ///
    /// Succeeds only if the call returns without error and with HTTP 200.
    /// Invalid bucket names fail without any call being made. Failures are
    /// logged here and never propagated.
    pub async fn create(&self) -> StepOutcome<BucketCreated> {
        info!(bucket = %self.name, region = %self.region, "creating bucket");

        let bucket = match BucketName::new(self.name.as_str()) {
            Ok(bucket) => bucket,
            Err(err) => {
                return StepOutcome::Failed(StepFailure::logged(
                    Step::CreateBucket,
                    FailureCause::Local(err),
                ));
            }
        };

        let response = match self.api.create_bucket(&bucket, &self.region).await {
            Ok(response) => response,
            Err(err) => {
                return StepOutcome::Failed(StepFailure::logged(
                    Step::CreateBucket,
                    FailureCause::Api(err),
                ));
            }
        };

        debug!(?response, "create_bucket response");
        if response.status != EXPECTED_STATUS {
            return StepOutcome::Failed(StepFailure::logged(
                Step::CreateBucket,
                FailureCause::BadStatus(response.status),
            ));
        }

        info!(bucket = %self.name, "bucket created");
        StepOutcome::Succeeded(response)
    }

    /// The bucket's ARN. Pure; no call is made and the name is not validated.
    #[must_use]
    pub fn get_arn(&self) -> String {
        bucket_arn(&self.name)
    }
}
