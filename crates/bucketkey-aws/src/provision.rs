//! The end-to-end provisioning flow.
//!
//! ```text
//! StorageClient::create ──fail──> Aborted (no IAM call, no state file)
//!        │ ok
//!        v
//! PolicyDocument::load ──err──> BucketKeyError
//!        │
//!        v
//! IdentityClient::create_user    (partial results allowed)
//!        │
//!        v
//! <output_dir>/<name>_state.json
//! ```

use std::ops::ControlFlow;
use std::path::PathBuf;

use bucketkey_core::{BucketKeyConfig, BucketKeyResult, PolicyDocument, ResultRecord};
use tracing::{info, warn};

use crate::api::{IdentityApi, StorageApi};
use crate::identity::IdentityClient;
use crate::step::{ProvisionReport, Step};
use crate::storage::StorageClient;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Name used for the bucket, the IAM user, and the state file.
    pub name: String,
    /// Path of the policy template.
    pub policy_path: PathBuf,
}

/// How a run ended.
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// The bucket could not be created; nothing else was attempted.
    Aborted {
        /// Step statuses up to the abort.
        report: ProvisionReport,
    },
    /// The run went through and a state file was written, possibly with
    /// missing fields if IAM steps failed.
    Completed {
        /// What was written.
        record: ResultRecord,
        /// Where it was written.
        state_file: PathBuf,
        /// Status of every step.
        report: ProvisionReport,
    },
}

impl ProvisionOutcome {
    /// The step report.
    #[must_use]
    pub fn report(&self) -> &ProvisionReport {
        match self {
            Self::Aborted { report } | Self::Completed { report, .. } => report,
        }
    }
}

/// Run the full flow against the given APIs.
///
/// # Errors
///
/// Fails if the policy template cannot be read or parsed, or if the state
/// file cannot be written. API failures never surface here; they end up in
/// the report.
pub async fn provision<S, I>(
    request: &ProvisionRequest,
    config: &BucketKeyConfig,
    storage: S,
    identity: I,
) -> BucketKeyResult<ProvisionOutcome>
where
    S: StorageApi,
    I: IdentityApi,
{
    let mut report = ProvisionReport::new();

    let storage = StorageClient::new(storage, request.name.as_str(), config.region.clone());
    let created = storage.create().await;
    if let ControlFlow::Break(()) = report.gate(Step::CreateBucket, created) {
        warn!(bucket = %request.name, "bucket creation failed, aborting");
        return Ok(ProvisionOutcome::Aborted { report });
    }

    let policy = PolicyDocument::load(&request.policy_path)?;
    let mut identity = IdentityClient::new(identity, request.name.as_str(), policy, storage.get_arn());
    let mut record = identity.create_user().await;
    report.extend(identity.into_report());

    record.s3name = Some(request.name.clone());

    let state_file = config.state_file_path(&request.name);
    record.write_to(&state_file, config.restrict_output_permissions)?;

    let failed: Vec<&str> = report.failed_steps().map(Step::as_str).collect();
    if failed.is_empty() {
        info!(state_file = %state_file.display(), "provisioning complete");
    } else {
        warn!(
            state_file = %state_file.display(),
            failed_steps = ?failed,
            "provisioning finished with failures"
        );
    }

    Ok(ProvisionOutcome::Completed {
        record,
        state_file,
        report,
    })
}
