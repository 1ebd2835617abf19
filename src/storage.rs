//! Object storage upload for generated sitemaps (S3-compatible, R2).

use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, Config as S3Config};
use tracing::{error, info};

use crate::config::StorageConfig;
use crate::TARGET_STORAGE;

pub struct Uploader {
    client: Client,
    bucket_name: String,
    folder: String,
}

impl Uploader {
    /// Configure an S3 client against the custom R2 endpoint.
    pub fn new(storage: &StorageConfig, folder: &str) -> Self {
        let creds = Credentials::new(
            storage.access_key_id.clone(),
            storage.secret_access_key.clone(),
            None,
            None,
            "custom",
        );
        let config = S3Config::builder()
            .region(Region::new("us-east-1")) // R2 ignores the region but the SDK requires one
            .endpoint_url(&storage.endpoint_url)
            .credentials_provider(creds)
            .behavior_version(BehaviorVersion::latest())
            .build();

        info!(target: TARGET_STORAGE, "Storage client initialized with endpoint: {}",
              storage.endpoint_url);

        Uploader {
            client: Client::from_conf(config),
            bucket_name: storage.bucket_name.clone(),
            folder: folder.to_string(),
        }
    }

    /// Upload the sitemap under `{folder}{filename}`. Errors are logged and
    /// reported as `false`; the local artifact is preserved regardless.
    pub async fn upload_sitemap(&self, content: Vec<u8>, filename: &str) -> bool {
        let key = if self.folder.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.folder.trim_end_matches('/'), filename)
        };

        info!(target: TARGET_STORAGE, "Attempting to upload to {}/{}", self.bucket_name, key);

        match self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(content))
            .content_type("application/xml")
            .send()
            .await
        {
            Ok(_) => {
                info!(target: TARGET_STORAGE, "Successfully uploaded {} to bucket {}",
                      key, self.bucket_name);
                true
            }
            Err(err) => {
                error!(target: TARGET_STORAGE, "Upload failed: {:?}", err);
                false
            }
        }
    }

    /// Materialize the folder prefix by putting a zero-byte object at it.
    pub async fn create_folder(&self, folder: &str) -> bool {
        let key = if folder.ends_with('/') {
            folder.to_string()
        } else {
            format!("{}/", folder)
        };

        match self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
        {
            Ok(_) => {
                info!(target: TARGET_STORAGE, "Successfully created folder: {}", key);
                true
            }
            Err(err) => {
                error!(target: TARGET_STORAGE, "Error creating folder in bucket: {:?}", err);
                false
            }
        }
    }
}
