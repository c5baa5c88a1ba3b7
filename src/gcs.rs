// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use std::error::Error;
use url::Url;

use super::gcloud;
use super::scratch::{ObjectStore, OwnershipOracle, StorageError};
use super::storage_path::GcsPath;

const STORAGE_BASE_URL: &str = "https://storage.googleapis.com/storage/v1/";
const RESOURCE_MANAGER_BASE_URL: &str = "https://cloudresourcemanager.googleapis.com/v1/";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BucketMetadata {
    project_number: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Project {
    project_id: String,
}

#[derive(Deserialize, Debug)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
}

#[derive(Deserialize, Debug)]
struct ObjectItem {
    name: String,
}

/// Cloud Storage and Resource Manager over REST, authenticated with the gcloud access token.
pub struct GcsClient {
    client: reqwest::Client,
    storage_base: Url,
    resource_manager_base: Url,
}

impl GcsClient {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", gcloud::access_token()?))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self::with_client(
            client,
            Url::parse(STORAGE_BASE_URL)?,
            Url::parse(RESOURCE_MANAGER_BASE_URL)?,
        ))
    }

    fn with_client(client: reqwest::Client, storage_base: Url, resource_manager_base: Url) -> Self {
        Self {
            client,
            storage_base,
            resource_manager_base,
        }
    }

    /// `.../b/{bucket}`
    fn bucket_url(&self, bucket: &str) -> Result<Url, StorageError> {
        let mut url = self.storage_base.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Backend(format!("Bad base URL: {}", self.storage_base)))?
            .pop_if_empty()
            .extend(["b", bucket]);
        Ok(url)
    }

    /// `.../b/{bucket}/o/{object}`, the object name encoded as one segment (slashes included).
    fn object_url(&self, path: &GcsPath) -> Result<Url, StorageError> {
        let mut url = self.bucket_url(&path.bucket)?;
        url.path_segments_mut()
            .map_err(|_| StorageError::Backend(format!("Bad base URL: {}", self.storage_base)))?
            .extend(["o", path.object.as_str()]);
        Ok(url)
    }

    /// `.../b/{bucket}/o?prefix={object}/&maxResults=1`, enough to tell whether a folder exists.
    fn folder_listing_url(&self, path: &GcsPath) -> Result<Url, StorageError> {
        let mut url = self.bucket_url(&path.bucket)?;
        url.path_segments_mut()
            .map_err(|_| StorageError::Backend(format!("Bad base URL: {}", self.storage_base)))?
            .push("o");
        url.query_pairs_mut()
            .append_pair("prefix", &format!("{}/", path.object.trim_end_matches('/')))
            .append_pair("maxResults", "1");
        Ok(url)
    }

    fn project_url(&self, project_number: &str) -> Result<Url, StorageError> {
        let mut url = self.resource_manager_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StorageError::Backend(format!("Bad base URL: {}", self.resource_manager_base))
            })?
            .pop_if_empty()
            .extend(["projects", project_number]);
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, StorageError> {
        debug!("GET {}", &url);
        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let res = check_status(&url, res).await?;
        res.json::<T>()
            .await
            .map_err(|e| StorageError::Backend(format!("Invalid response from {}: {}", &url, e)))
    }
}

/// Maps non-2xx responses to `StorageError`, keeping the response body for diagnostics.
async fn check_status(url: &Url, res: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    debug!("{} returned {}: {}", url, status, &body);
    if status == StatusCode::NOT_FOUND {
        Err(StorageError::NotFound(url.to_string()))
    } else {
        Err(StorageError::Backend(format!("{} returned {}: {}", url, status, body)))
    }
}

fn parse_path(uri: &str) -> Result<GcsPath, StorageError> {
    GcsPath::parse(uri).map_err(|e| StorageError::Backend(e.to_string()))
}

#[async_trait]
impl OwnershipOracle for GcsClient {
    async fn resolve_owning_project(&self, bucket_uri: &str) -> Result<String, StorageError> {
        let path = parse_path(bucket_uri)?;

        let mut url = self.bucket_url(&path.bucket)?;
        url.query_pairs_mut().append_pair("fields", "projectNumber");
        let bucket: BucketMetadata = self.get_json(url).await?;
        debug!("Bucket {} has project number {}", &path.bucket, &bucket.project_number);

        let project: Project = self
            .get_json(self.project_url(&bucket.project_number)?)
            .await?;
        Ok(project.project_id)
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn is_directory(&self, uri: &str) -> Result<bool, StorageError> {
        let path = parse_path(uri)?;
        if path.is_directory_like() {
            return Ok(true);
        }

        let listing: ObjectList = self.get_json(self.folder_listing_url(&path)?).await?;
        if let Some(item) = listing.items.first() {
            debug!("{} is a folder, it holds {}", uri, &item.name);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_object(&self, uri: &str) -> Result<(), StorageError> {
        let path = parse_path(uri)?;
        if path.is_directory_like() {
            return Err(StorageError::Backend(format!(
                "Refusing to delete {}: not a single object",
                uri
            )));
        }

        let url = self.object_url(&path)?;
        debug!("DELETE {}", &url);
        let res = self
            .client
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(&url, res).await?;
        Ok(())
    }
}
