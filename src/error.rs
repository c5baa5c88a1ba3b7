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

use std::fmt;
use thiserror::Error;

use super::resource_ref::{ResourceKind, NAMING_GUIDELINES_URL};
use super::scratch::StorageError;

/// Errors returned by identifier parsing and scratch bucket verification.
///
/// Every variant is terminal for the import that produced it; nothing here is retried.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{input:?} is not a valid {kind} resource identifier. See {url} for naming guidelines.", url = NAMING_GUIDELINES_URL)]
    InvalidResourceIdentifier { kind: ResourceKind, input: String },

    #[error("{input:?} is not a valid Cloud Storage path. Expected gs://BUCKET/OBJECT")]
    InvalidStoragePath { input: String },

    #[error("Scratch bucket {bucket:?} is not in project {project:?}.{cleanup}")]
    ScratchBucketWrongProject {
        bucket: String,
        project: String,
        cleanup: Cleanup,
    },

    #[error("Scratch bucket {bucket:?} is not in project {project:?}. Source {source_uri:?} is a directory or empty marker, not a single file; nothing was removed.")]
    EmptyOrAmbiguousSource {
        bucket: String,
        project: String,
        source_uri: String,
    },

    #[error("Failed to resolve the owning project of scratch bucket {bucket:?}")]
    OwnerLookup {
        bucket: String,
        #[source]
        source: StorageError,
    },

    #[error("Scratch bucket verification was cancelled")]
    Cancelled,
}

/// What happened to the source file after an ownership mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    NotAttempted,
    Deleted(String),
    DeleteFailed(String, String),
}

impl fmt::Display for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleanup::NotAttempted => Ok(()),
            Cleanup::Deleted(uri) => write!(f, " Deleted {:?}", uri),
            Cleanup::DeleteFailed(uri, reason) => {
                write!(f, " Failed to delete {:?}: {}", uri, reason)
            }
        }
    }
}
