//! Cloudflare R2 storage for uploaded note images.

use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream, Client};
use aws_types::region::Region;

use super::{build_media_key, FileStorage, UploadFile};
use crate::config::Environment;
use crate::models::NoteId;
use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const ENV_ACCOUNT_ID: &str = "R2_ACCOUNT_ID";
const ENV_BUCKET: &str = "R2_BUCKET";
const ENV_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
const ENV_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
const ENV_PUBLIC_BASE_URL: &str = "R2_PUBLIC_BASE_URL";

/// Cloudflare R2 configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct R2Config {
    /// Cloudflare account identifier.
    pub account_id: String,
    /// R2 bucket name.
    pub bucket: String,
    /// Access key id for S3-compatible auth.
    pub access_key_id: String,
    /// Secret access key for S3-compatible auth.
    pub secret_access_key: String,
    /// Optional public URL base for serving media.
    pub public_base_url: Option<String>,
}

impl R2Config {
    /// Load R2 configuration from an environment snapshot.
    ///
    /// Returns `Ok(None)` when no R2 variables are set and an error when only
    /// part of the configuration is present.
    pub fn from_environment(env: &Environment) -> Result<Option<Self>> {
        parse_config(|key| env.get(key).map(ToOwned::to_owned))
    }

    /// Cloudflare R2 S3-compatible endpoint URL.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

/// R2-backed file storage.
#[derive(Clone, Debug)]
pub struct R2Storage {
    config: R2Config,
    client: Client,
}

impl R2Storage {
    #[must_use]
    pub fn new(config: R2Config) -> Self {
        let client = build_s3_client(&config);
        Self { config, client }
    }

    #[must_use]
    pub const fn config(&self) -> &R2Config {
        &self.config
    }

    /// Upload object bytes to the configured bucket.
    pub async fn upload_bytes(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(object_key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|error| {
                storage_error("put_object", &self.config.bucket, Some(object_key), error)
            })?;

        Ok(())
    }

    /// Retrievable URL for an object: the public URL when a base is
    /// configured, otherwise the path-style bucket URL.
    #[must_use]
    pub fn object_url(&self, object_key: &str) -> String {
        let key = object_key.trim_matches('/');
        self.config.public_base_url.as_ref().map_or_else(
            || format!("{}/{}/{key}", self.config.endpoint_url(), self.config.bucket),
            |base| format!("{base}/{key}"),
        )
    }

    async fn store(&self, note_id: NoteId, file: UploadFile) -> Result<String> {
        let key = build_media_key(&note_id, &file.file_name);
        let content_type = file.content_type();
        self.upload_bytes(&key, file.bytes, &content_type).await?;
        tracing::debug!("Uploaded {} to R2 bucket {}", key, self.config.bucket);
        Ok(self.object_url(&key))
    }
}

impl FileStorage for R2Storage {
    fn upload(
        &self,
        note_id: NoteId,
        file: UploadFile,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        self.store(note_id, file)
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<R2Config>> {
    let account_id = lookup(ENV_ACCOUNT_ID).map(|value| value.trim().to_string());
    let bucket = lookup(ENV_BUCKET).map(|value| value.trim().to_string());
    let access_key_id = lookup(ENV_ACCESS_KEY_ID).map(|value| value.trim().to_string());
    let secret_access_key = lookup(ENV_SECRET_ACCESS_KEY).map(|value| value.trim().to_string());
    let public_base_url = lookup(ENV_PUBLIC_BASE_URL);

    let any_present = account_id.is_some()
        || bucket.is_some()
        || access_key_id.is_some()
        || secret_access_key.is_some()
        || public_base_url.is_some();

    if !any_present {
        return Ok(None);
    }

    let required = [
        (ENV_ACCOUNT_ID, account_id),
        (ENV_BUCKET, bucket),
        (ENV_ACCESS_KEY_ID, access_key_id),
        (ENV_SECRET_ACCESS_KEY, secret_access_key),
    ];
    let missing = required
        .iter()
        .filter(|(_, value)| value.as_ref().map_or(true, String::is_empty))
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(Error::InvalidInput(format!(
            "R2 configuration is incomplete. Missing: {}",
            missing.join(", ")
        )));
    }

    let [account_id, bucket, access_key_id, secret_access_key] =
        required.map(|(_, value)| value.unwrap_or_default());

    Ok(Some(R2Config {
        account_id,
        bucket,
        access_key_id,
        secret_access_key,
        public_base_url: normalize_public_base_url(public_base_url)?,
    }))
}

fn build_s3_client(config: &R2Config) -> Client {
    let credentials = Credentials::new(
        config.access_key_id.clone(),
        config.secret_access_key.clone(),
        None,
        None,
        "bitacora-core-r2-storage",
    );

    let sdk_config = aws_sdk_s3::config::Builder::new()
        .region(Region::new("auto"))
        .credentials_provider(credentials)
        .endpoint_url(config.endpoint_url())
        .force_path_style(true)
        .build();

    Client::from_conf(sdk_config)
}

fn storage_error(
    operation: &str,
    bucket: &str,
    object_key: Option<&str>,
    error: impl std::fmt::Display,
) -> Error {
    let target = object_key.map_or_else(|| bucket.to_string(), |key| format!("{bucket}/{key}"));
    Error::Storage(format!("R2 {operation} failed for {target}: {error}"))
}

fn normalize_public_base_url(public_base_url: Option<String>) -> Result<Option<String>> {
    let Some(value) = normalize_text_option(public_base_url) else {
        return Ok(None);
    };
    if !is_http_url(&value) {
        return Err(Error::InvalidInput(
            "R2_PUBLIC_BASE_URL must start with http:// or https://".to_string(),
        ));
    }

    Ok(Some(value.trim_end_matches('/').to_string()))
}
