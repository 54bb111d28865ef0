use crate::storage::backend::{ObjectStore, ObjectStream};
use crate::types::{ListDirPage, ObjectMetadata, ObjectSummary, error::StoreError};
use aws_sdk_s3::Client as S3Client;
use futures::stream::StreamExt;
use http_body_util::BodyExt;

pub struct S3Backend {
    client: S3Client,
    bucket: String,
}

impl S3Backend {
    pub async fn new(
        bucket: String,
        region: String,
        endpoint: Option<String>,
        force_path_style: bool,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region));

        // Set credentials if provided; otherwise the ambient chain applies
        if let (Some(key_id), Some(secret_key)) = (access_key_id, secret_access_key) {
            config_loader = config_loader.credentials_provider(
                aws_sdk_s3::config::Credentials::new(key_id, secret_key, None, None, "static"),
            );
        }

        let config = config_loader.load().await;

        let mut s3_config_builder =
            aws_sdk_s3::config::Builder::from(&config).force_path_style(force_path_style);

        if let Some(endpoint_url) = endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        let s3_config = s3_config_builder.build();
        let client = S3Client::from_conf(s3_config);

        Ok(Self { client, bucket })
    }

    /// Helper function to extract metadata from AWS SDK response
    fn extract_metadata(
        key: &str,
        content_length: Option<i64>,
        etag: Option<&str>,
        last_modified: Option<&aws_sdk_s3::primitives::DateTime>,
        content_type: Option<&str>,
    ) -> ObjectMetadata {
        let size = content_length.unwrap_or(0) as u64;
        let etag = etag.map(|s| s.to_string()).unwrap_or_default();
        let last_modified = last_modified
            .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), 0))
            .unwrap_or_else(chrono::Utc::now);
        let content_type = content_type
            .map(|s| s.to_string())
            .unwrap_or_else(|| "binary/octet-stream".to_string());

        ObjectMetadata {
            key: key.to_string(),
            size,
            etag,
            last_modified,
            content_type,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Backend {
    async fn list_dir(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListDirPage, StoreError> {
        tracing::debug!(
            "[{}] Listing prefix {:?} (continuation: {:?})",
            self.bucket,
            prefix,
            continuation
        );

        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/");

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }

        let result = request.send().await;

        match result {
            Ok(output) => {
                let common_prefixes: Vec<String> = output
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string))
                    .collect();

                let objects: Vec<ObjectSummary> = output
                    .contents()
                    .iter()
                    .filter_map(|obj| {
                        Some(ObjectSummary {
                            key: obj.key()?.to_string(),
                            size: obj.size(),
                            last_modified: obj
                                .last_modified()
                                .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), 0)),
                        })
                    })
                    .collect();

                tracing::debug!(
                    "[{}] Page: {} prefixes, {} objects",
                    self.bucket,
                    common_prefixes.len(),
                    objects.len()
                );

                Ok(ListDirPage {
                    common_prefixes,
                    objects,
                    is_truncated: output.is_truncated().unwrap_or(false),
                    next_continuation_token: output
                        .next_continuation_token()
                        .map(str::to_string),
                })
            }
            Err(err) => {
                tracing::error!("[{}] Failed to list prefix {:?}: {}", self.bucket, prefix, err);
                Err(StoreError::ListFailed(format!(
                    "list_objects_v2 on {}: {}",
                    self.bucket, err
                )))
            }
        }
    }

    async fn get_object(&self, key: &str) -> Result<(ObjectStream, ObjectMetadata), StoreError> {
        tracing::debug!("[{}] Getting object: {}", self.bucket, key);

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let metadata = Self::extract_metadata(
                    key,
                    output.content_length(),
                    output.e_tag(),
                    output.last_modified(),
                    output.content_type(),
                );

                let bucket = self.bucket.clone();
                // ByteStream wraps an SdkBody which can be converted to a stream of frames
                let body = output.body.into_inner();
                let stream = body.into_data_stream().map(move |result| {
                    result.map_err(|e| {
                        tracing::error!("[{}] Failed to read object chunk: {}", bucket, e);
                        StoreError::ReadFailed(format!("failed to read object: {}", e))
                    })
                });

                Ok((Box::pin(stream), metadata))
            }
            Err(_err) => {
                tracing::warn!("[{}] Object not found: {}", self.bucket, key);
                Err(StoreError::NoSuchKey)
            }
        }
    }
}
