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
use log::{debug, info, warn};
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::error::{Cleanup, ImportError};
use super::storage_path::GcsPath;

/// Errors reported by the storage collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Tells which project owns a bucket.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// `bucket_uri` is `gs://BUCKET`. Returns the owning project ID.
    async fn resolve_owning_project(&self, bucket_uri: &str) -> Result<String, StorageError>;
}

/// Removes a single object. Never deletes by prefix.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// True when `uri` names a folder: a `uri/` marker or any object under `uri/` exists.
    async fn is_directory(&self, uri: &str) -> Result<bool, StorageError>;

    async fn delete_object(&self, uri: &str) -> Result<(), StorageError>;
}

/// The scratch location an import stages its intermediate files in (e.g. `gs://bucket/dir/`).
#[derive(Debug, Clone)]
pub struct StagingLocation {
    pub uri: String,
}

/// The user's file to import (e.g. `gs://bucket/dir/disk.vmdk`).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub uri: String,
}

/// Checks that `staging` belongs to `target_project` before an import may use it.
///
/// On a mismatch the import fails. If `source` is a single file inside the staging directory, it is
/// deleted so it doesn't linger in a bucket the importer doesn't control. A directory-like source
/// fails with `EmptyOrAmbiguousSource` and nothing is deleted. At most one object is ever deleted.
pub async fn verify_ownership(
    target_project: &str,
    staging: &StagingLocation,
    source: Option<&SourceFile>,
    oracle: &dyn OwnershipOracle,
    store: &dyn ObjectStore,
    cancel: &CancellationToken,
) -> Result<(), ImportError> {
    let staging_path = GcsPath::parse(&staging.uri)?;
    let source_path = source.map(|s| GcsPath::parse(&s.uri)).transpose()?;

    let bucket_uri = staging_path.bucket_uri();
    let owner = cancellable(cancel, oracle.resolve_owning_project(&bucket_uri))
        .await?
        .map_err(|e| ImportError::OwnerLookup {
            bucket: staging_path.bucket.clone(),
            source: e,
        })?;
    debug!("Scratch bucket {} is owned by project {:?}", &bucket_uri, &owner);

    if owner == target_project {
        return Ok(());
    }
    warn!(
        "Scratch bucket {} belongs to project {:?}, not {:?}",
        &bucket_uri, &owner, target_project
    );

    let source_path = match source_path {
        Some(path) if path.is_directory_like() => {
            return Err(ImportError::EmptyOrAmbiguousSource {
                bucket: staging_path.bucket,
                project: target_project.to_string(),
                source_uri: path.to_string(),
            })
        }
        Some(path) if staging_path.contains(&path) => path,
        _ => {
            return Err(ImportError::ScratchBucketWrongProject {
                bucket: staging_path.bucket,
                project: target_project.to_string(),
                cleanup: Cleanup::NotAttempted,
            })
        }
    };

    let uri = source_path.to_string();
    let ambiguous = || ImportError::EmptyOrAmbiguousSource {
        bucket: staging_path.bucket.clone(),
        project: target_project.to_string(),
        source_uri: uri.clone(),
    };
    match cancellable(cancel, store.is_directory(&uri)).await? {
        Ok(false) => {}
        Ok(true) => return Err(ambiguous()),
        Err(e) => {
            warn!("Could not tell whether {} is a folder: {}", &uri, e);
            return Err(ambiguous());
        }
    }

    let cleanup = match cancellable(cancel, store.delete_object(&uri)).await? {
        Ok(()) => {
            info!("Deleted {} from scratch bucket {}", &uri, &bucket_uri);
            Cleanup::Deleted(uri)
        }
        Err(e) => {
            warn!("Failed to delete {}: {}", &uri, e);
            Cleanup::DeleteFailed(uri, e.to_string())
        }
    };

    Err(ImportError::ScratchBucketWrongProject {
        bucket: staging_path.bucket,
        project: target_project.to_string(),
        cleanup,
    })
}

/// Race a collaborator call against caller-side cancellation.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> Result<T, ImportError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ImportError::Cancelled),
        out = call => Ok(out),
    }
}
