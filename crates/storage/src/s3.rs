use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{error::DisplayErrorContext, presigning::PresigningConfig, Client};
use shelf_kernel::settings::StorageSettings;

use crate::UploadSigner;

/// SigV4 presigner for a single S3 bucket.
pub struct S3UploadSigner {
    client: Client,
    bucket: String,
}

impl S3UploadSigner {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the AWS default provider chain. The configured
    /// region, when present, overrides the chain's.
    pub async fn from_settings(settings: &StorageSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), settings.bucket.clone())
    }
}

#[async_trait]
impl UploadSigner for S3UploadSigner {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;

        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;

    fn offline_signer() -> S3UploadSigner {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
                None,
                None,
                "test",
            ))
            .build();
        S3UploadSigner::new(Client::from_conf(config), "covers")
    }

    #[tokio::test]
    async fn presigned_put_expires_after_an_hour() {
        let signer = offline_signer();
        let url = signer
            .presign_put("dune.jpg", "image/jpeg", crate::UPLOAD_URL_TTL)
            .await
            .unwrap();

        assert!(url.starts_with("https://covers.s3."), "{url}");
        assert!(url.contains("/dune.jpg?"), "{url}");
        assert!(url.contains("X-Amz-Expires=3600"), "{url}");
        assert!(url.contains("X-Amz-Signature="), "{url}");
    }

    #[tokio::test]
    async fn overlong_expiry_is_rejected() {
        let signer = offline_signer();
        let err = signer
            .presign_put("dune.jpg", "image/jpeg", Duration::from_secs(8 * 86_400))
            .await
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
