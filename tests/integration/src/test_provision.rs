//! End-to-end provisioning integration tests.

#[cfg(test)]
mod tests {
    use bucketkey_aws::{ProvisionOutcome, ProvisionRequest, provision};
    use bucketkey_core::{AwsRegion, BucketKeyConfig};

    use crate::{TEST_REGION, identity_api, storage_api, test_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_state_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let policy_path = dir.path().join("policy.json");
        std::fs::write(&policy_path, r#"{"Statement":[{"Resource":"/*"}]}"#).unwrap();

        let name = test_name("e2e");
        let config = BucketKeyConfig::builder()
            .region(AwsRegion::new(TEST_REGION))
            .output_dir(dir.path().to_path_buf())
            .build();
        let request = ProvisionRequest {
            name: name.clone(),
            policy_path,
        };

        let outcome = provision(&request, &config, storage_api(), identity_api())
            .await
            .expect("provision");

        let ProvisionOutcome::Completed { state_file, .. } = outcome else {
            panic!("run should complete");
        };
        let state: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(state_file).unwrap()).unwrap();
        assert_eq!(state["s3name"], name.as_str());
        assert_eq!(state["iam_username"], format!("s3-{name}-user").as_str());
        assert!(!state["iam_policy_arn"].as_str().unwrap().is_empty());
        assert!(!state["access_key"].as_str().unwrap().is_empty());
        assert!(!state["secret_key"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_abort_when_bucket_name_is_taken() {
        let dir = tempfile::tempdir().unwrap();
        let policy_path = dir.path().join("policy.json");
        std::fs::write(&policy_path, r#"{"Statement":[{"Resource":"/*"}]}"#).unwrap();

        let name = test_name("taken");
        let config = BucketKeyConfig::builder()
            .region(AwsRegion::new(TEST_REGION))
            .output_dir(dir.path().to_path_buf())
            .build();
        let request = ProvisionRequest {
            name: name.clone(),
            policy_path,
        };
        provision(&request, &config, storage_api(), identity_api())
            .await
            .expect("first run");
        std::fs::remove_file(config.state_file_path(&name)).unwrap();

        let outcome = provision(&request, &config, storage_api(), identity_api())
            .await
            .expect("second run");

        assert!(!config.state_file_path(&name).exists());
        assert!(matches!(outcome, ProvisionOutcome::Aborted { .. }));
    }
}
