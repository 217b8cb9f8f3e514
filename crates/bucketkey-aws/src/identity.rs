//! IAM user, policy, and access key provisioning for one bucket.

use std::ops::ControlFlow;

use bucketkey_core::validation::{validate_policy_name, validate_user_name};
use bucketkey_core::{PolicyDocument, ResultRecord};
use tracing::{debug, info, warn};

use crate::api::{AccessKeyPair, IdentityApi};
use crate::step::{FailureCause, ProvisionReport, Step, StepFailure, StepOutcome};

const USER_PREFIX: &str = "s3-";
const USER_SUFFIX: &str = "-user";
const POLICY_SUFFIX: &str = "-policy";

/// IAM user name derived from a run name: `s3-<name>-user`.
#[must_use]
pub fn user_name_for(name: &str) -> String {
    format!("{USER_PREFIX}{name}{USER_SUFFIX}")
}

/// Managed policy name derived from a user name: `<user>-policy`.
#[must_use]
pub fn policy_name_for(user_name: &str) -> String {
    format!("{user_name}{POLICY_SUFFIX}")
}

/// Creates an IAM user scoped to one bucket and mints its access key.
#[derive(Debug)]
pub struct IdentityClient<A> {
    api: A,
    name: String,
    policy: PolicyDocument,
    bucket_arn: String,
    report: ProvisionReport,
}

impl<A: IdentityApi> IdentityClient<A> {
    /// Create a client that will provision for run `name`, granting the
    /// template `policy` on `bucket_arn`.
    pub fn new(
        api: A,
        name: impl Into<String>,
        policy: PolicyDocument,
        bucket_arn: impl Into<String>,
    ) -> Self {
        Self {
            api,
            name: name.into(),
            policy,
            bucket_arn: bucket_arn.into(),
            report: ProvisionReport::new(),
        }
    }

    /// The policy document as it currently stands.
    #[must_use]
    pub fn policy(&self) -> &PolicyDocument {
        &self.policy
    }

    /// What happened to each step of the last [`IdentityClient::create_user`] run.
    #[must_use]
    pub fn report(&self) -> &ProvisionReport {
        &self.report
    }

    /// Consume the client, returning its report.
    #[must_use]
    pub fn into_report(self) -> ProvisionReport {
        self.report
    }

    /// Run the identity sequence and return whatever it produced.
    ///
    /// Steps run in order: inject the bucket ARN into the policy, create the
    /// user, register the policy, attach it, generate a key. Only a failed
    /// user creation stops the sequence (and yields an empty record); every
    /// other failure is logged and the sequence carries on.
    pub async fn create_user(&mut self) -> ResultRecord {
        info!(name = %self.name, "creating IAM user");
        self.report = ProvisionReport::new();

        let injected = self.inject_resource();
        self.report.record(Step::InjectResource, injected);

        let created = self.create_iam_user().await;
        let user_name = match self.report.gate(Step::CreateUser, created) {
            ControlFlow::Continue(Some(user_name)) => user_name,
            _ => return ResultRecord::default(),
        };

        let registered = self.create_policy(&user_name).await;
        let policy_arn = self.report.record(Step::CreatePolicy, registered);

        let attached = match &policy_arn {
            Some(arn) => self.attach_policy(&user_name, arn).await,
            None => {
                warn!(user = %user_name, "no policy registered, skipping attach");
                StepOutcome::Skipped
            }
        };
        self.report.record(Step::AttachPolicy, attached);

        let generated = self.generate_key(&user_name).await;
        let key = self.report.record(Step::CreateAccessKey, generated);

        match &key {
            Some(key) => info!(
                access_key = %key.access_key_id,
                secret_key = %key.secret_access_key,
                "access key generated"
            ),
            None => warn!(user = %user_name, "no access key generated"),
        }

        let mut record = partial_record(user_name, policy_arn);
        if let Some(key) = key {
            record.access_key = Some(key.access_key_id);
            record.secret_key = Some(key.secret_access_key);
        }

        info!(?record, "identity provisioned");
        record
    }

    fn inject_resource(&mut self) -> StepOutcome<usize> {
        info!(bucket_arn = %self.bucket_arn, "injecting bucket ARN into policy");
        debug!(policy = ?self.policy.as_value(), "policy before injection");

        match self.policy.inject_resource_prefix(&self.bucket_arn) {
            Ok(count) => {
                debug!(policy = ?self.policy.as_value(), "policy after injection");
                info!(statements = count, "policy resources rewritten");
                StepOutcome::Succeeded(count)
            }
            Err(err) => StepOutcome::Failed(StepFailure::logged(
                Step::InjectResource,
                FailureCause::Local(err),
            )),
        }
    }

    async fn create_iam_user(&self) -> StepOutcome<String> {
        let user_name = user_name_for(&self.name);
        if let Err(err) = validate_user_name(&user_name) {
            return StepOutcome::Failed(StepFailure::logged(
                Step::CreateUser,
                FailureCause::Local(err),
            ));
        }

        match self.api.create_user(&user_name).await {
            Ok(user) => {
                debug!(?user, "create_user response");
                info!(user = %user.user_name, "IAM user created");
                StepOutcome::Succeeded(user.user_name)
            }
            Err(err) => {
                StepOutcome::Failed(StepFailure::logged(Step::CreateUser, FailureCause::Api(err)))
            }
        }
    }

    async fn create_policy(&self, user_name: &str) -> StepOutcome<String> {
        let policy_name = policy_name_for(user_name);
        info!(policy = %policy_name, "creating policy");

        if let Err(err) = validate_policy_name(&policy_name) {
            return StepOutcome::Failed(StepFailure::logged(
                Step::CreatePolicy,
                FailureCause::Local(err),
            ));
        }
        let document = match self.policy.to_submission_json() {
            Ok(document) => document,
            Err(err) => {
                return StepOutcome::Failed(StepFailure::logged(
                    Step::CreatePolicy,
                    FailureCause::Local(err),
                ));
            }
        };
        debug!(%document, "policy document");

        match self.api.create_policy(&policy_name, &document).await {
            Ok(policy) => {
                debug!(?policy, "create_policy response");
                info!(policy_arn = %policy.arn, "policy created");
                StepOutcome::Succeeded(policy.arn)
            }
            Err(err) => StepOutcome::Failed(StepFailure::logged(
                Step::CreatePolicy,
                FailureCause::Api(err),
            )),
        }
    }

    async fn attach_policy(&self, user_name: &str, policy_arn: &str) -> StepOutcome<()> {
        info!(user = %user_name, policy_arn = %policy_arn, "attaching policy");
        match self.api.attach_user_policy(user_name, policy_arn).await {
            Ok(()) => {
                info!("policy attached");
                StepOutcome::Succeeded(())
            }
            Err(err) => StepOutcome::Failed(StepFailure::logged(
                Step::AttachPolicy,
                FailureCause::Api(err),
            )),
        }
    }

    async fn generate_key(&self, user_name: &str) -> StepOutcome<AccessKeyPair> {
        info!(user = %user_name, "generating access key");
        match self.api.create_access_key(user_name).await {
            Ok(key) => StepOutcome::Succeeded(key),
            Err(err) => StepOutcome::Failed(StepFailure::logged(
                Step::CreateAccessKey,
                FailureCause::Api(err),
            )),
        }
    }
}

/// Record for a run that got as far as creating the user. A policy that
/// failed to register is recorded as an empty ARN.
fn partial_record(user_name: String, policy_arn: Option<String>) -> ResultRecord {
    ResultRecord {
        iam_username: Some(user_name),
        iam_policy_arn: Some(policy_arn.unwrap_or_default()),
        ..ResultRecord::default()
    }
}
