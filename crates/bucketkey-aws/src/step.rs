//! Steps of a provisioning run and what happens when one fails.
//!
//! Every client method returns a [`StepOutcome`]. The flow feeds each outcome
//! through [`ProvisionReport::gate`], which records it and consults
//! [`Step::failure_policy`] to decide whether the run goes on. Steps that
//! never abort go through [`ProvisionReport::record`] instead.
//!
//! | Step | On failure |
//! |------|------------|
//! | `CreateBucket` | abort the run |
//! | `InjectResource` | continue with the template as injection left it |
//! | `CreateUser` | abort the identity flow (empty record) |
//! | `CreatePolicy` | continue, policy ARN recorded as `""` |
//! | `AttachPolicy` | continue |
//! | `CreateAccessKey` | continue, no key in the record |

use std::fmt;
use std::ops::ControlFlow;

use bucketkey_core::BucketKeyError;
use tracing::error;

use crate::error::ApiError;

/// One step of a provisioning run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Create the S3 bucket.
    CreateBucket,
    /// Prefix the policy template's resources with the bucket ARN.
    InjectResource,
    /// Create the IAM user.
    CreateUser,
    /// Register the managed policy.
    CreatePolicy,
    /// Attach the policy to the user.
    AttachPolicy,
    /// Generate the access key pair.
    CreateAccessKey,
}

/// What a failed step does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop; later steps are not attempted.
    Abort,
    /// Log and carry on.
    Continue,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Self; 6] = [
        Self::CreateBucket,
        Self::InjectResource,
        Self::CreateUser,
        Self::CreatePolicy,
        Self::AttachPolicy,
        Self::CreateAccessKey,
    ];

    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateBucket => "create_bucket",
            Self::InjectResource => "inject_resource",
            Self::CreateUser => "create_user",
            Self::CreatePolicy => "create_policy",
            Self::AttachPolicy => "attach_policy",
            Self::CreateAccessKey => "create_access_key",
        }
    }

    /// The policy table.
    #[must_use]
    pub const fn failure_policy(self) -> FailurePolicy {
        match self {
            Self::CreateBucket | Self::CreateUser => FailurePolicy::Abort,
            Self::InjectResource
            | Self::CreatePolicy
            | Self::AttachPolicy
            | Self::CreateAccessKey => FailurePolicy::Continue,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step failed.
#[derive(Debug)]
pub enum FailureCause {
    /// The API call failed.
    Api(ApiError),
    /// The call returned, but with a status other than 200.
    BadStatus(u16),
    /// Local input was rejected before any call was made.
    Local(BucketKeyError),
}

impl FailureCause {
    /// Short error-kind name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Api(err) => err.kind.as_str(),
            Self::BadStatus(_) => "BadStatusCode",
            Self::Local(BucketKeyError::MalformedPolicy(_)) => "MalformedPolicy",
            Self::Local(BucketKeyError::InvalidName { .. }) => "InvalidName",
            Self::Local(_) => "LocalError",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::BadStatus(status) => write!(f, "unexpected HTTP status {status}"),
            Self::Local(err) => write!(f, "{err}"),
        }
    }
}

/// A failed step together with its cause.
#[derive(Debug)]
pub struct StepFailure {
    /// The step that failed.
    pub step: Step,
    /// Why it failed.
    pub cause: FailureCause,
}

impl StepFailure {
    /// Create a failure and log it at ERROR.
    pub fn logged(step: Step, cause: FailureCause) -> Self {
        let failure = Self { step, cause };
        match &failure.cause {
            FailureCause::Api(err) => error!(
                step = %step,
                kind = failure.cause.kind(),
                code = err.code.as_deref().unwrap_or("-"),
                status = err.status.unwrap_or_default(),
                error = %err.message,
                "step failed"
            ),
            cause => error!(step = %step, kind = cause.kind(), error = %cause, "step failed"),
        }
        failure
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.cause)
    }
}

/// Tagged result of a single step.
#[derive(Debug)]
pub enum StepOutcome<T> {
    /// The step produced a value.
    Succeeded(T),
    /// The step was attempted and failed.
    Failed(StepFailure),
    /// The step was not attempted because its input was missing.
    Skipped,
}

impl<T> StepOutcome<T> {
    /// Whether the step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Whether the step was attempted and failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Recorded status of a step, kept for the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step succeeded.
    Succeeded,
    /// The step failed.
    Failed {
        /// Error-kind name.
        kind: &'static str,
        /// Error message.
        message: String,
    },
    /// The step was not attempted.
    Skipped,
}

/// Status of every step attempted during a run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    entries: Vec<(Step, StepStatus)>,
}

impl ProvisionReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outcome` for `step` and decide whether the run continues.
    ///
    /// Returns `Break` only when the step failed and its policy is
    /// [`FailurePolicy::Abort`]; otherwise `Continue` with the step's value,
    /// if it produced one.
    pub fn gate<T>(&mut self, step: Step, outcome: StepOutcome<T>) -> ControlFlow<(), Option<T>> {
        match outcome {
            StepOutcome::Succeeded(value) => {
                self.entries.push((step, StepStatus::Succeeded));
                ControlFlow::Continue(Some(value))
            }
            StepOutcome::Skipped => {
                self.entries.push((step, StepStatus::Skipped));
                ControlFlow::Continue(None)
            }
            StepOutcome::Failed(failure) => {
                self.entries.push((
                    step,
                    StepStatus::Failed {
                        kind: failure.cause.kind(),
                        message: failure.cause.to_string(),
                    },
                ));
                match step.failure_policy() {
                    FailurePolicy::Abort => ControlFlow::Break(()),
                    FailurePolicy::Continue => ControlFlow::Continue(None),
                }
            }
        }
    }

    /// Record `outcome` for a step whose failures never stop the run and
    /// return its value, if it produced one.
    pub fn record<T>(&mut self, step: Step, outcome: StepOutcome<T>) -> Option<T> {
        debug_assert_eq!(step.failure_policy(), FailurePolicy::Continue);
        self.gate(step, outcome).continue_value().flatten()
    }

    /// Status recorded for `step`, if it was reached.
    #[must_use]
    pub fn status(&self, step: Step) -> Option<&StepStatus> {
        self.entries
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, status)| status)
    }

    /// Steps that were attempted and failed.
    pub fn failed_steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.entries
            .iter()
            .filter(|(_, status)| matches!(status, StepStatus::Failed { .. }))
            .map(|(step, _)| *step)
    }

    /// Whether every recorded step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, status)| *status == StepStatus::Succeeded)
    }

    /// Append the entries of another report.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    fn api_failure(step: Step) -> StepOutcome<String> {
        StepOutcome::Failed(StepFailure {
            step,
            cause: FailureCause::Api(ApiError::new("Op", ApiErrorKind::Service, "boom")),
        })
    }

    #[test]
    fn test_should_abort_only_on_bucket_and_user() {
        let aborting: Vec<Step> = Step::ALL
            .into_iter()
            .filter(|s| s.failure_policy() == FailurePolicy::Abort)
            .collect();
        assert_eq!(aborting, vec![Step::CreateBucket, Step::CreateUser]);
    }

    #[test]
    fn test_should_break_on_abort_step_failure() {
        let mut report = ProvisionReport::new();
        let flow = report.gate(Step::CreateUser, api_failure(Step::CreateUser));

        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(report.failed_steps().collect::<Vec<_>>(), vec![Step::CreateUser]);
    }

    #[test]
    fn test_should_continue_on_advisory_step_failure() {
        let mut report = ProvisionReport::new();
        let flow = report.gate(Step::CreatePolicy, api_failure(Step::CreatePolicy));

        assert_eq!(flow, ControlFlow::Continue(None));
        assert!(matches!(
            report.status(Step::CreatePolicy),
            Some(StepStatus::Failed { kind: "ServiceError", .. })
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_should_record_advisory_steps_as_optional_values() {
        let mut report = ProvisionReport::new();

        let arn = report.record(Step::CreatePolicy, api_failure(Step::CreatePolicy));
        let key = report.record(Step::CreateAccessKey, StepOutcome::Succeeded("AKIA".to_owned()));

        assert_eq!(arn, None);
        assert_eq!(key.as_deref(), Some("AKIA"));
        assert_eq!(report.failed_steps().collect::<Vec<_>>(), vec![Step::CreatePolicy]);
    }

    #[test]
    fn test_should_pass_value_through_on_success() {
        let mut report = ProvisionReport::new();
        let flow = report.gate(Step::CreateUser, StepOutcome::Succeeded("alice".to_owned()));

        assert_eq!(flow, ControlFlow::Continue(Some("alice".to_owned())));
        assert!(report.is_clean());
    }

    #[test]
    fn test_should_record_skipped_steps() {
        let mut report = ProvisionReport::new();
        let flow = report.gate::<()>(Step::AttachPolicy, StepOutcome::Skipped);

        assert_eq!(flow, ControlFlow::Continue(None));
        assert_eq!(report.status(Step::AttachPolicy), Some(&StepStatus::Skipped));
        assert_eq!(report.failed_steps().count(), 0);
    }

    #[test]
    fn test_should_name_bad_status_kind() {
        assert_eq!(FailureCause::BadStatus(409).kind(), "BadStatusCode");
        assert_eq!(
            FailureCause::BadStatus(409).to_string(),
            "unexpected HTTP status 409"
        );
    }
}
