//! Upload authorizations: short-lived signed `PUT` URLs that let a client
//! write one object without holding store credentials.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelf_kernel::{InitCtx, Module};

mod s3;

pub use s3::S3UploadSigner;

/// How long an issued upload URL stays valid.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// Content type the signature is bound to. Clients that send a different
/// `Content-Type` on their `PUT` override it.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Signs write access to a single object key.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    /// Bucket every key is scoped to
    fn bucket(&self) -> &str;

    /// Produce a pre-signed `PUT` URL for `key`
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String>;
}

pub type DynUploadSigner = Arc<dyn UploadSigner>;

/// Response of an upload authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAuthorization {
    /// Signed URL to `PUT` the object bytes to
    pub upload_url: String,
    /// Where the object can be fetched once uploaded
    pub file_url: String,
}

/// Public address of an object, `https://{bucket}.s3.amazonaws.com/{key}`.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

/// Issue an authorization to upload `filename` as a JPEG for one hour.
pub async fn authorize_upload(
    signer: &dyn UploadSigner,
    filename: &str,
) -> anyhow::Result<UploadAuthorization> {
    let upload_url = signer
        .presign_put(filename, DEFAULT_CONTENT_TYPE, UPLOAD_URL_TTL)
        .await?;

    tracing::debug!(
        target: "shelf-storage",
        bucket = signer.bucket(),
        key = filename,
        "issued upload authorization"
    );

    Ok(UploadAuthorization {
        upload_url,
        file_url: public_url(signer.bucket(), filename),
    })
}

/// Core module reporting on the configured bucket.
pub struct StorageModule {
    signer: DynUploadSigner,
}

impl StorageModule {
    pub fn new(signer: DynUploadSigner) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl Module for StorageModule {
    fn name(&self) -> &'static str {
        "storage"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.signer.bucket().is_empty() {
            tracing::warn!(
                module = self.name(),
                "no storage bucket configured; upload authorizations will fail"
            );
        } else {
            tracing::info!(
                module = self.name(),
                bucket = self.signer.bucket(),
                "storage ready"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSigner {
        calls: Mutex<Vec<(String, String, Duration)>>,
    }

    #[async_trait]
    impl UploadSigner for RecordingSigner {
        fn bucket(&self) -> &str {
            "covers"
        }

        async fn presign_put(
            &self,
            key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push((
                key.to_string(),
                content_type.to_string(),
                expires_in,
            ));
            Ok(format!("https://signed.example/{key}"))
        }
    }

    #[test]
    fn public_url_is_virtual_hosted() {
        assert_eq!(
            public_url("covers", "dune.jpg"),
            "https://covers.s3.amazonaws.com/dune.jpg"
        );
    }

    #[tokio::test]
    async fn authorization_is_one_hour_jpeg() {
        let signer = RecordingSigner::default();
        let auth = authorize_upload(&signer, "dune.png").await.unwrap();

        assert_eq!(auth.upload_url, "https://signed.example/dune.png");
        assert_eq!(auth.file_url, "https://covers.s3.amazonaws.com/dune.png");

        let calls = signer.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                "dune.png".to_string(),
                "image/jpeg".to_string(),
                Duration::from_secs(3600)
            )]
        );
    }
}
