//! Runtime configuration for bucketkey.
//!
//! Configuration is loaded from environment variables; the CLI layers its
//! explicit flags on top of the result.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::types::AwsRegion;

/// bucketkey configuration.
///
/// # Examples
///
/// ```
/// use bucketkey_core::BucketKeyConfig;
///
/// let config = BucketKeyConfig::default();
/// assert_eq!(config.region.as_str(), "ap-northeast-1");
/// assert!(config.restrict_output_permissions);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BucketKeyConfig {
    /// Region the bucket is created in and the SDK clients are bound to.
    #[builder(default)]
    pub region: AwsRegion,

    /// Custom endpoint for both S3 and IAM (e.g. a local emulator).
    #[builder(default, setter(strip_option))]
    pub endpoint_url: Option<String>,

    /// Named profile for the credential chain.
    #[builder(default, setter(strip_option))]
    pub profile: Option<String>,

    /// Directory the `<name>_state.json` file is written to.
    #[builder(default = PathBuf::from("."))]
    pub output_dir: PathBuf,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("debug"))]
    pub log_level: String,

    /// Use path-style S3 addressing. Needed by most local emulators.
    #[builder(default = false)]
    pub force_path_style: bool,

    /// Create the state file readable by the owner only.
    #[builder(default = true)]
    pub restrict_output_permissions: bool,
}

impl Default for BucketKeyConfig {
    fn default() -> Self {
        Self {
            region: AwsRegion::default(),
            endpoint_url: None,
            profile: None,
            output_dir: PathBuf::from("."),
            log_level: String::from("debug"),
            force_path_style: false,
            restrict_output_permissions: true,
        }
    }
}

impl BucketKeyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `BUCKETKEY_REGION` (then `AWS_REGION`) | `ap-northeast-1` |
    /// | `AWS_ENDPOINT_URL` | *(unset)* |
    /// | `AWS_PROFILE` | *(unset)* |
    /// | `BUCKETKEY_OUTPUT_DIR` | `.` |
    /// | `LOG_LEVEL` | `debug` |
    /// | `BUCKETKEY_FORCE_PATH_STYLE` | `false` |
    /// | `BUCKETKEY_RESTRICT_OUTPUT` | `true` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("BUCKETKEY_REGION").or_else(|| lookup("AWS_REGION")) {
            config.region = AwsRegion::new(v);
        }
        if let Some(v) = lookup("AWS_ENDPOINT_URL") {
            config.endpoint_url = Some(v);
        }
        if let Some(v) = lookup("AWS_PROFILE") {
            config.profile = Some(v);
        }
        if let Some(v) = lookup("BUCKETKEY_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("BUCKETKEY_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Some(v) = lookup("BUCKETKEY_RESTRICT_OUTPUT") {
            config.restrict_output_permissions = parse_bool(&v);
        }

        config
    }

    /// Path of the state file for a run named `name`.
    #[must_use]
    pub fn state_file_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_state.json"))
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
