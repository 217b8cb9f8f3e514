//! IAM policy templates and bucket resource injection.
//!
//! A template is an ordinary IAM policy document whose statements carry
//! bucket-relative resources such as `"/*"` or `"/reports/*"`. Injection turns
//! them into absolute ARNs by prefixing each one with the bucket ARN:
//!
//! ```text
//! {"Statement": [{"Resource": "/*"}]}
//!        | inject "arn:aws:s3:::mybucket"
//!        v
//! {"Statement": [{"Resource": "arn:aws:s3:::mybucket/*"}]}
//! ```
//!
//! The document is otherwise kept as opaque JSON, key order included, so
//! whatever the template says besides `Resource` reaches IAM untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::{BucketKeyError, BucketKeyResult};

const STATEMENT_KEY: &str = "Statement";
const RESOURCE_KEY: &str = "Resource";

/// Indentation used when a policy is submitted to IAM.
const SUBMIT_INDENT: &[u8] = b"    ";

/// An IAM policy document loaded from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument(Value);

impl PolicyDocument {
    /// Wrap an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Read and parse a policy template from disk.
    ///
    /// Any JSON value is accepted here; shape problems surface later, during
    /// [`PolicyDocument::inject_resource_prefix`].
    pub fn load(path: impl AsRef<Path>) -> BucketKeyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BucketKeyError::PolicyRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value = serde_json::from_str(&raw).map_err(|source| BucketKeyError::PolicyParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self(value))
    }

    /// The underlying JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Prefix every statement's `Resource` with `prefix`, in place.
    ///
    /// A `Resource` may be a string or an array of strings. Statements are
    /// rewritten in order and the first malformed one stops the rewrite;
    /// statements before it keep their new prefix. Returns the number of
    /// statements rewritten.
    ///
    /// Not idempotent: calling it twice prefixes twice.
    ///
    /// # Errors
    ///
    /// Returns [`BucketKeyError::MalformedPolicy`] if the document is not an
    /// object, has no `Statement` array, or a statement lacks a string (or
    /// string array) `Resource`.
    pub fn inject_resource_prefix(&mut self, prefix: &str) -> BucketKeyResult<usize> {
        if !self.0.is_object() {
            return Err(BucketKeyError::MalformedPolicy(
                "policy document must be a JSON object".to_owned(),
            ));
        }
        let statements = match self.0.get_mut(STATEMENT_KEY) {
            Some(Value::Array(statements)) => statements,
            Some(_) => {
                return Err(BucketKeyError::MalformedPolicy(format!(
                    "`{STATEMENT_KEY}` must be an array"
                )));
            }
            None => {
                return Err(BucketKeyError::MalformedPolicy(format!(
                    "missing `{STATEMENT_KEY}`"
                )));
            }
        };

        for (index, statement) in statements.iter_mut().enumerate() {
            let resource = statement.get_mut(RESOURCE_KEY).ok_or_else(|| {
                BucketKeyError::MalformedPolicy(format!("statement {index} has no `{RESOURCE_KEY}`"))
            })?;
            *resource = prefixed(resource, prefix).ok_or_else(|| {
                BucketKeyError::MalformedPolicy(format!(
                    "statement {index} `{RESOURCE_KEY}` must be a string or an array of strings"
                ))
            })?;
        }
        Ok(statements.len())
    }

    /// Serialize the document the way it is submitted to IAM: pretty-printed
    /// with a four-space indent.
    pub fn to_submission_json(&self) -> BucketKeyResult<String> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(SUBMIT_INDENT));
        self.0.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn prefixed(resource: &Value, prefix: &str) -> Option<Value> {
    match resource {
        Value::String(path) => Some(Value::String(format!("{prefix}{path}"))),
        Value::Array(items) => items
            .iter()
            .map(|item| prefixed_str(item, prefix))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

fn prefixed_str(item: &Value, prefix: &str) -> Option<Value> {
    item.as_str()
        .map(|path| Value::String(format!("{prefix}{path}")))
}
