//! Bucket creation integration tests.

#[cfg(test)]
mod tests {
    use bucketkey_aws::{ApiErrorKind, StorageApi, StorageClient};
    use bucketkey_core::{AwsRegion, BucketName};

    use crate::{TEST_REGION, storage_api, test_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_bucket_with_status_200() {
        let api = storage_api();
        let bucket = BucketName::new(test_name("create")).unwrap();

        let created = api
            .create_bucket(&bucket, &AwsRegion::new(TEST_REGION))
            .await
            .expect("create_bucket");

        assert_eq!(created.status, 200);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_bucket_with_location_constraint() {
        let api = storage_api();
        let bucket = BucketName::new(test_name("constraint")).unwrap();

        let created = api
            .create_bucket(&bucket, &AwsRegion::new("ap-northeast-1"))
            .await
            .expect("create_bucket with location constraint");

        assert_eq!(created.status, 200);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_bucket() {
        let api = storage_api();
        let bucket = BucketName::new(test_name("dup")).unwrap();
        let region = AwsRegion::new(TEST_REGION);
        api.create_bucket(&bucket, &region).await.expect("first create");

        let err = api
            .create_bucket(&bucket, &region)
            .await
            .expect_err("duplicate bucket should fail");

        assert_eq!(err.operation, "CreateBucket");
        assert_eq!(err.kind, ApiErrorKind::Service);
        assert!(err.code.is_some());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_storage_client_success() {
        let name = test_name("client");
        let client = StorageClient::new(storage_api(), name.as_str(), AwsRegion::new(TEST_REGION));

        assert!(client.create().await.is_success());
        assert_eq!(client.get_arn(), format!("arn:aws:s3:::{name}"));
    }
}
