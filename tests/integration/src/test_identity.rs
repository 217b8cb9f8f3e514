//! IAM integration tests.

#[cfg(test)]
mod tests {
    use bucketkey_aws::identity::user_name_for;
    use bucketkey_aws::{IdentityApi, IdentityClient, Step};
    use bucketkey_core::PolicyDocument;
    use serde_json::json;

    use crate::{identity_api, test_name};

    fn template() -> PolicyDocument {
        PolicyDocument::from_value(json!({
            "Version": "2012-10-17",
            "Statement": [
                {"Effect": "Allow", "Action": ["s3:GetObject", "s3:PutObject"], "Resource": "/*"},
                {"Effect": "Allow", "Action": "s3:ListBucket", "Resource": ""}
            ]
        }))
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_user_policy_and_key() {
        let name = test_name("iam");
        let arn = format!("arn:aws:s3:::{name}");
        let mut client = IdentityClient::new(identity_api(), name.as_str(), template(), arn);

        let record = client.create_user().await;

        assert_eq!(record.iam_username, Some(user_name_for(&name)));
        assert!(!record.iam_policy_arn.unwrap_or_default().is_empty());
        assert!(!record.access_key.unwrap_or_default().is_empty());
        assert!(!record.secret_key.expect("secret key").is_empty());
        assert!(client.report().is_clean(), "{:?}", client.report());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_user() {
        let api = identity_api();
        let user = user_name_for(&test_name("dupuser"));
        api.create_user(&user).await.expect("first create_user");

        let err = api.create_user(&user).await.unwrap_err();

        assert_eq!(err.operation, "CreateUser");
        assert!(err.code.is_some());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_empty_record_for_existing_user() {
        let name = test_name("exists");
        identity_api()
            .create_user(&user_name_for(&name))
            .await
            .expect("pre-create user");

        let mut client = IdentityClient::new(identity_api(), name.as_str(), template(), "arn:aws:s3:::x");
        let record = client.create_user().await;

        assert!(record.is_empty());
        assert_eq!(
            client.report().failed_steps().collect::<Vec<_>>(),
            vec![Step::CreateUser]
        );
    }
}
