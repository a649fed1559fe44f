//! S3-backed [`ObjectStore`].

use std::path::Path;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;

use agol_core::{ObjectStore, StorageError};

use crate::runtime::blocking_runtime;

/// Blocking S3 client.
#[derive(Debug)]
pub struct S3Store {
    client: Client,
    runtime: Runtime,
}

impl S3Store {
    /// Build a client from the default AWS credential chain.
    ///
    /// `region` overrides the region chain (`AWS_REGION`, profile, IMDS).
    pub fn new(region: Option<String>) -> std::io::Result<Self> {
        let runtime = blocking_runtime()?;
        let region_provider =
            RegionProviderChain::first_try(region.map(Region::new)).or_default_provider();
        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(region_provider)
                .load(),
        );
        Ok(Self {
            client: Client::new(&config),
            runtime,
        })
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let data = self
            .open(bucket, key)
            .await?
            .collect()
            .await
            .map_err(|e| object_error(bucket, key, e))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn open(&self, bucket: &str, key: &str) -> Result<ByteStream, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| object_error(bucket, key, DisplayErrorContext(&e)))?;
        Ok(output.body)
    }
}

impl ObjectStore for S3Store {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let result = self
            .runtime
            .block_on(self.client.head_object().bucket(bucket).key(key).send());
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(object_error(bucket, key, DisplayErrorContext(&e))),
        }
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.runtime.block_on(self.fetch(bucket, key))
    }

    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        tracing::debug!("put s3://{bucket}/{key} ({} bytes)", body.len());
        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .body(ByteStream::from(body))
                    .send(),
            )
            .map_err(|e| object_error(bucket, key, DisplayErrorContext(&e)))?;
        Ok(())
    }

    fn download_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        tracing::debug!("download s3://{bucket}/{key} -> {}", dest.display());
        let written = self.runtime.block_on(async {
            let body = self.open(bucket, key).await?;
            write_body(bucket, key, body, dest).await
        })?;
        tracing::debug!("wrote {written} bytes to {}", dest.display());
        Ok(())
    }

    fn upload_file(&self, bucket: &str, key: &str, src: &Path) -> Result<(), StorageError> {
        tracing::debug!("upload {} -> s3://{bucket}/{key}", src.display());
        self.runtime.block_on(async {
            let body = file_body(src).await?;
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| object_error(bucket, key, DisplayErrorContext(&e)))
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Streaming helpers
// ---------------------------------------------------------------------------

/// Copy `body` chunk by chunk into a new file at `dest`.
async fn write_body(
    bucket: &str,
    key: &str,
    mut body: ByteStream,
    dest: &Path,
) -> Result<u64, StorageError> {
    let io = |source: std::io::Error| StorageError::Io {
        path: dest.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::create(dest).await.map_err(io)?;
    let mut written = 0u64;
    while let Some(chunk) = body
        .try_next()
        .await
        .map_err(|e| object_error(bucket, key, e))?
    {
        file.write_all(&chunk).await.map_err(io)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io)?;
    Ok(written)
}

/// Request body read from `src` as it is sent.
async fn file_body(src: &Path) -> Result<ByteStream, StorageError> {
    ByteStream::from_path(src)
        .await
        .map_err(|e| StorageError::Io {
            path: src.to_path_buf(),
            source: std::io::Error::other(e),
        })
}

fn object_error(bucket: &str, key: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::Object {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: err.to_string(),
    }
}
