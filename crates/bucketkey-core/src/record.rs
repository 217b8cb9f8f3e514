//! The record a provisioning run leaves behind.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BucketKeyError, BucketKeyResult};
use crate::types::SecretKey;

/// Identifiers and credentials produced by a run.
///
/// Every field is optional: a run that fails partway simply leaves out what it
/// never produced, and absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Access key ID of the generated key pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Secret access key of the generated key pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<SecretKey>,

    /// Name of the created IAM user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_username: Option<String>,

    /// ARN of the registered policy; empty when registration failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_policy_arn: Option<String>,

    /// Name of the bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3name: Option<String>,
}

impl ResultRecord {
    /// Whether no field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compact JSON form of the record.
    pub fn to_json(&self) -> BucketKeyResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the record to `path` as compact JSON, replacing any existing file.
    ///
    /// With `owner_only` set the file is created with mode `0600` on Unix.
    pub fn write_to(&self, path: impl AsRef<Path>, owner_only: bool) -> BucketKeyResult<()> {
        let path = path.as_ref();
        let body = self.to_json()?;
        let state_err = |source| BucketKeyError::StateWrite {
            path: path.to_path_buf(),
            source,
        };

        let mut file = open_state_file(path, owner_only).map_err(state_err)?;
        file.write_all(body.as_bytes()).map_err(state_err)?;
        file.flush().map_err(state_err)?;

        debug!(path = %path.display(), bytes = body.len(), "state file written");
        Ok(())
    }
}

#[cfg(unix)]
fn open_state_file(path: &Path, owner_only: bool) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if owner_only {
        options.mode(0o600);
    }
    let file = options.open(path)?;
    if owner_only {
        // `mode` only applies when the file is newly created.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

#[cfg(not(unix))]
fn open_state_file(path: &Path, _owner_only: bool) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
