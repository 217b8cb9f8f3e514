//! bucketkey - create an S3 bucket and an IAM user scoped to it.
//!
//! The user gets a managed policy built from a template whose resources are
//! relative to the bucket, plus an access key. Identifiers and credentials are
//! written to `<name>_state.json`.
//!
//! # Usage
//!
//! ```text
//! bucketkey --name mybucket --policy policy.json
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BUCKETKEY_REGION` / `AWS_REGION` | `ap-northeast-1` | Bucket region |
//! | `AWS_ENDPOINT_URL` | *(unset)* | Custom S3/IAM endpoint |
//! | `AWS_PROFILE` | *(unset)* | Credential profile |
//! | `BUCKETKEY_OUTPUT_DIR` | `.` | Where the state file goes |
//! | `BUCKETKEY_FORCE_PATH_STYLE` | `false` | Path-style S3 addressing |
//! | `BUCKETKEY_RESTRICT_OUTPUT` | `true` | Create the state file as `0600` |
//! | `LOG_LEVEL` | `debug` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! Flags take precedence over the environment.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bucketkey_aws::sdk::{SdkIdentityApi, SdkStorageApi, load_sdk_config};
use bucketkey_aws::{ProvisionOutcome, ProvisionRequest, provision};
use bucketkey_core::{AwsRegion, BucketKeyConfig};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create an S3 bucket and an IAM user with access to it.
#[derive(Debug, Parser)]
#[command(name = "bucketkey", version, about, long_about = None)]
struct Cli {
    /// Name used for the bucket, the IAM user, and the state file.
    #[arg(short, long)]
    name: String,

    /// Policy template whose statement resources are relative to the bucket.
    #[arg(short, long)]
    policy: PathBuf,

    /// Region to create the bucket in.
    #[arg(long)]
    region: Option<String>,

    /// Custom endpoint for S3 and IAM.
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Credential profile.
    #[arg(long)]
    profile: Option<String>,

    /// Directory the state file is written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level filter.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Layer explicit flags over `config`.
    fn apply(&self, config: &mut BucketKeyConfig) {
        if let Some(region) = &self.region {
            config.region = AwsRegion::new(region.as_str());
        }
        if let Some(endpoint) = &self.endpoint_url {
            config.endpoint_url = Some(endpoint.clone());
        }
        if let Some(profile) = &self.profile {
            config.profile = Some(profile.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
    }

    fn request(&self) -> ProvisionRequest {
        ProvisionRequest {
            name: self.name.clone(),
            policy_path: self.policy.clone(),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `log_level` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = BucketKeyConfig::from_env();
    cli.apply(&mut config);

    init_tracing(&config.log_level)?;

    info!(
        name = %cli.name,
        policy = %cli.policy.display(),
        region = %config.region,
        version = VERSION,
        "starting bucketkey",
    );

    let sdk_config = load_sdk_config(&config).await;
    let storage = SdkStorageApi::from_sdk_config(&sdk_config, config.force_path_style);
    let identity = SdkIdentityApi::from_sdk_config(&sdk_config);

    let outcome = provision(&cli.request(), &config, storage, identity)
        .await
        .with_context(|| format!("provisioning {} failed", cli.name))?;

    match outcome {
        ProvisionOutcome::Aborted { .. } => {
            error!(name = %cli.name, "bucket was not created, nothing else was attempted");
            Ok(ExitCode::FAILURE)
        }
        ProvisionOutcome::Completed { state_file, .. } => {
            info!(state_file = %state_file.display(), "done");
            Ok(ExitCode::SUCCESS)
        }
    }
}
