//! Name validation for the resources bucketkey creates.
//!
//! Bucket rules follow the
//! [Amazon S3 naming rules](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html);
//! IAM rules follow the
//! [IAM quotas page](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_iam-quotas.html).

use std::net::Ipv4Addr;

use crate::error::{BucketKeyError, BucketKeyResult};

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum IAM user name length.
const MAX_USER_NAME_LEN: usize = 64;

/// Maximum IAM managed policy name length.
const MAX_POLICY_NAME_LEN: usize = 128;

fn invalid(name: &str, reason: impl Into<String>) -> BucketKeyError {
    BucketKeyError::InvalidName {
        name: name.to_owned(),
        reason: reason.into(),
    }
}

/// Validate an S3 bucket name.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address
/// - Reserved prefixes `xn--`, `sthree-` and suffix `-s3alias` are rejected
///
/// # Examples
///
/// ```
/// use bucketkey_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("mybucket").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> BucketKeyResult<()> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid(
            name,
            format!(
                "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            name,
            "bucket name must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !is_alnum(name.as_bytes()[0]) || !is_alnum(name.as_bytes()[len - 1]) {
        return Err(invalid(
            name,
            "bucket name must start and end with a letter or number",
        ));
    }

    if name.contains("..") {
        return Err(invalid(name, "bucket name must not contain consecutive dots"));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid(
            name,
            "bucket name must not be formatted as an IP address",
        ));
    }

    for prefix in ["xn--", "sthree-"] {
        if name.starts_with(prefix) {
            return Err(invalid(
                name,
                format!("bucket name must not start with '{prefix}'"),
            ));
        }
    }

    if name.ends_with("-s3alias") {
        return Err(invalid(name, "bucket name must not end with '-s3alias'"));
    }

    Ok(())
}

/// Characters IAM accepts in user and policy names besides ASCII alphanumerics.
fn is_iam_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+=,.@_-".contains(c)
}

fn validate_iam_name(name: &str, kind: &str, max_len: usize) -> BucketKeyResult<()> {
    if name.is_empty() || name.len() > max_len {
        return Err(invalid(
            name,
            format!("{kind} name must be between 1 and {max_len} characters long"),
        ));
    }
    if !name.chars().all(is_iam_name_char) {
        return Err(invalid(
            name,
            format!("{kind} name may only contain alphanumerics and '+=,.@_-'"),
        ));
    }
    Ok(())
}

/// Validate an IAM user name (1-64 characters of `[A-Za-z0-9+=,.@_-]`).
pub fn validate_user_name(name: &str) -> BucketKeyResult<()> {
    validate_iam_name(name, "user", MAX_USER_NAME_LEN)
}

/// Validate an IAM managed policy name (1-128 characters of `[A-Za-z0-9+=,.@_-]`).
pub fn validate_policy_name(name: &str) -> BucketKeyResult<()> {
    validate_iam_name(name, "policy", MAX_POLICY_NAME_LEN)
}
