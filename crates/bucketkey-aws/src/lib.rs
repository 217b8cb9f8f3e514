//! S3 and IAM provisioning clients for bucketkey.
//!
//! # Architecture
//!
//! ```text
//!        provision()            (driver flow, step policy table)
//!         |        |
//!         v        v
//!  StorageClient  IdentityClient   (one method per step, StepOutcome results)
//!         |        |
//!         v        v
//!   StorageApi   IdentityApi       (async seams; SDK impls in `sdk`)
//!         |        |
//!         v        v
//!   aws-sdk-s3   aws-sdk-iam
//! ```
//!
//! Errors from the SDK are collapsed into [`ApiError`] at the seam and turned
//! into [`StepOutcome::Failed`] at the client boundary; whether a failed step
//! stops the run is decided by [`Step::failure_policy`].

pub mod api;
pub mod error;
pub mod identity;
pub mod provision;
pub mod sdk;
pub mod step;
pub mod storage;

#[cfg(test)]
mod fake;

pub use api::{AccessKeyPair, BucketCreated, CreatedPolicy, CreatedUser, IdentityApi, StorageApi};
pub use error::{ApiError, ApiErrorKind};
pub use identity::IdentityClient;
pub use provision::{ProvisionOutcome, ProvisionRequest, provision};
pub use step::{
    FailureCause, FailurePolicy, ProvisionReport, Step, StepFailure, StepOutcome, StepStatus,
};
pub use storage::StorageClient;
