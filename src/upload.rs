//! File upload operations.
//!
//! Uploads travel as `multipart/form-data`, bypassing the executor's JSON
//! path. Batch upload fans out one request per file, joins them all, and
//! reports successes and failures side by side; a partial failure never
//! silently drops the files that made it through.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::{ApiError, Result};
use crate::response::normalize_as;

/// A file staged for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn into_part(self) -> Result<Part> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(content_type) = self.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ApiError::Parse(format!("invalid content type: {}", e)))?;
        }
        Ok(part)
    }
}

/// Stored-file descriptor returned by the upload endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One file that failed during a batch upload.
#[derive(Debug)]
pub struct UploadFailure {
    /// Position of the file in the submitted batch.
    pub index: usize,
    pub file_name: String,
    pub error: ApiError,
}

/// Combined outcome of a batch upload.
///
/// Both halves are always populated: succeeding files are reported even
/// when others in the batch fail.
#[derive(Debug, Default)]
pub struct BatchUploadReport {
    pub uploaded: Vec<FileDescriptor>,
    pub failed: Vec<UploadFailure>,
}

impl BatchUploadReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload catalog over the lost-and-found service.
pub struct Uploads<'a> {
    client: &'a ApiClient,
}

impl<'a> Uploads<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let outcome = self
            .client
            .executor()
            .execute_multipart(Service::LostFound, path, form)
            .await?;
        self.client.funnel(normalize_as(outcome)).await
    }

    /// Upload a single image into a folder.
    pub async fn upload_image(&self, file: UploadFile, folder: &str) -> Result<FileDescriptor> {
        let form = Form::new()
            .part("file", file.into_part()?)
            .text("folder", folder.to_string());
        let descriptor: FileDescriptor = self.send("/upload/image", form).await?;
        Ok(self.absolutize(descriptor))
    }

    /// Upload several images in one request.
    pub async fn upload_images(
        &self,
        files: Vec<UploadFile>,
        folder: &str,
    ) -> Result<Vec<FileDescriptor>> {
        let mut form = Form::new().text("folder", folder.to_string());
        for file in files {
            form = form.part("files", file.into_part()?);
        }
        let descriptors: Vec<FileDescriptor> = self.send("/upload/images", form).await?;
        Ok(descriptors
            .into_iter()
            .map(|d| self.absolutize(d))
            .collect())
    }

    /// Attach images to an item: one independent request per file, all
    /// issued concurrently and joined before reporting.
    pub async fn upload_item_images(
        &self,
        files: Vec<UploadFile>,
        item_type: &str,
        related_item_id: Option<i64>,
    ) -> BatchUploadReport {
        let related = related_item_id.map(|id| id.to_string()).unwrap_or_default();

        let tasks = files.into_iter().enumerate().map(|(index, file)| {
            let related = related.clone();
            async move {
                let file_name = file.file_name.clone();
                let result = self
                    .upload_one_item_image(file, item_type, &related)
                    .await;
                (index, file_name, result)
            }
        });

        let mut report = BatchUploadReport::default();
        for (index, file_name, result) in futures::future::join_all(tasks).await {
            match result {
                Ok(descriptors) => {
                    report
                        .uploaded
                        .extend(descriptors.into_iter().map(|d| self.absolutize(d)));
                }
                Err(error) => {
                    warn!(index, %file_name, %error, "Item image upload failed");
                    report.failed.push(UploadFailure {
                        index,
                        file_name,
                        error,
                    });
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Batch item-image upload finished"
        );
        report
    }

    async fn upload_one_item_image(
        &self,
        file: UploadFile,
        item_type: &str,
        related_item_id: &str,
    ) -> Result<Vec<FileDescriptor>> {
        let form = Form::new()
            .part("files", file.into_part()?)
            .text("itemType", item_type.to_string())
            .text("relatedItemId", related_item_id.to_string());
        self.send("/upload/item-images", form).await
    }

    /// List the images attached to an item.
    pub async fn item_images(&self, item_id: i64) -> Result<Vec<FileDescriptor>> {
        let descriptors: Vec<FileDescriptor> = self
            .client
            .call(crate::request::RequestSpec::get(
                Service::LostFound,
                format!("/upload/item-images/{}", item_id),
            ))
            .await?;
        Ok(descriptors
            .into_iter()
            .map(|d| self.absolutize(d))
            .collect())
    }

    /// Remove an uploaded item image by its upload id.
    pub async fn delete_item_image(&self, upload_id: i64) -> Result<()> {
        self.client
            .delete(Service::LostFound, &format!("/upload/images/{}", upload_id))
            .await?;
        Ok(())
    }

    /// Remove a general image by its stored URL.
    pub async fn delete_image(&self, file_url: &str) -> Result<()> {
        self.client
            .call_raw(
                crate::request::RequestSpec::delete(Service::LostFound, "/upload/image")
                    .body(serde_json::json!({ "fileUrl": file_url })),
            )
            .await?;
        Ok(())
    }

    /// The backend returns server-relative URLs; prefix the service base
    /// so callers can use them directly.
    fn absolutize(&self, mut descriptor: FileDescriptor) -> FileDescriptor {
        if !descriptor.url.starts_with("http") {
            descriptor.url = format!(
                "{}{}",
                self.client.executor().config().base_url(Service::LostFound),
                descriptor.url
            );
        }
        descriptor
    }
}
