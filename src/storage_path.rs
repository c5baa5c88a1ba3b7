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

use super::error::ImportError;

const GCS_SCHEME: &str = "gs://";

/// A `gs://bucket/object` path split into its bucket and object name.
/// The object name is empty for a bucket root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsPath {
    pub bucket: String,
    pub object: String,
}

impl GcsPath {
    pub fn parse(uri: &str) -> Result<Self, ImportError> {
        let invalid = || ImportError::InvalidStoragePath {
            input: uri.to_string(),
        };
        let rest = uri.strip_prefix(GCS_SCHEME).ok_or_else(invalid)?;
        let (bucket, object) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }

    /// `gs://bucket`, the form the ownership oracle is asked about.
    pub fn bucket_uri(&self) -> String {
        format!("{}{}", GCS_SCHEME, self.bucket)
    }

    /// True for a bucket root or anything ending in `/` (a prefix or an empty directory marker).
    pub fn is_directory_like(&self) -> bool {
        self.object.is_empty() || self.object.ends_with('/')
    }

    /// Whether `other` lies strictly inside this path, compared on whole `/`-separated segments.
    ///
    /// `gs://b/dir/` contains `gs://b/dir/disk.vmdk` but not `gs://b/dir2/disk.vmdk`,
    /// and `gs://b/dir/disk.vmdk` never contains `gs://b/dir/disk.vmdk.sha256`.
    pub fn contains(&self, other: &GcsPath) -> bool {
        if self.bucket != other.bucket {
            return false;
        }
        let dir = self.object.trim_end_matches('/');
        if dir.is_empty() {
            return !other.object.is_empty();
        }
        match other.object.strip_prefix(dir) {
            Some(rest) => rest.len() > 1 && rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for GcsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.object.is_empty() {
            write!(f, "{}{}", GCS_SCHEME, self.bucket)
        } else {
            write!(f, "{}{}/{}", GCS_SCHEME, self.bucket, self.object)
        }
    }
}
