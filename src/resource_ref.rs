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

use log::debug;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::error::ImportError;

/// Linked from every invalid identifier error so users can fix their input.
pub const NAMING_GUIDELINES_URL: &str = "https://cloud.google.com/compute/docs/naming-resources";

/// URL prefixes stripped before matching. Versioned prefixes require https, unversioned ones must not have it.
static RESOURCE_URL_PREFIXES: &[&str] = &[
    "https://www.googleapis.com/compute/v1/",
    "https://compute.googleapis.com/compute/v1/",
    "//www.googleapis.com/compute/",
    "//compute.googleapis.com/compute/",
];

/// `[projects/PROJECT/][global/networks/]NAME`
static NETWORK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:projects/([^/]+)/)?(?:global/networks/)?([^/]+)$")
        .expect("network pattern should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Network,
    Subnetwork,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Subnetwork => write!(f, "subnet"),
        }
    }
}

/// A parsed network or subnetwork identifier.
///
/// The all-empty value (`ResourceRef::default()`) means "not specified" and formats to `""`.
/// `region` is only ever set by `parse_subnetwork`, and only together with `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRef {
    pub name: String,
    pub project: String,
    pub region: String,
}

impl ResourceRef {
    /// Canonical network path: `[projects/PROJECT/]global/networks/NAME`, or `""` without a name.
    pub fn network_path(&self) -> String {
        if self.name.is_empty() {
            return String::new();
        }
        let mut segments = Vec::new();
        if !self.project.is_empty() {
            segments.extend(["projects", self.project.as_str()]);
        }
        segments.extend(["global", "networks", self.name.as_str()]);
        segments.join("/")
    }

    /// Canonical subnetwork path.
    ///
    /// A project without a region can't be placed in a path, so it is dropped and only the bare name is returned.
    pub fn subnetwork_path(&self) -> String {
        debug_assert!(
            self.region.is_empty() || !self.name.is_empty(),
            "region set without a name: {:?}",
            self
        );
        if self.name.is_empty() {
            return String::new();
        }
        if self.region.is_empty() {
            return self.name.clone();
        }
        let mut segments = Vec::new();
        if !self.project.is_empty() {
            segments.extend(["projects", self.project.as_str()]);
        }
        segments.extend([
            "regions",
            self.region.as_str(),
            "subnetworks",
            self.name.as_str(),
        ]);
        segments.join("/")
    }
}

/// Strips a Compute Engine API URL prefix, leaving the path that starts at `projects/`, `global/`, `regions/` or the bare name.
/// Input without a recognized prefix is returned unchanged.
pub fn trim_resource_prefix(s: &str) -> &str {
    RESOURCE_URL_PREFIXES
        .iter()
        .find_map(|prefix| s.strip_prefix(prefix))
        .unwrap_or(s)
}

/// Parse a network identifier such as `default`, `global/networks/default`,
/// `projects/p/global/networks/default`, or its full API URL.
pub fn parse_network(input: &str) -> Result<ResourceRef, ImportError> {
    if input.is_empty() {
        return Ok(ResourceRef::default());
    }

    let trimmed = trim_resource_prefix(input);
    let caps = NETWORK_PATTERN.captures(trimmed).ok_or_else(|| {
        ImportError::InvalidResourceIdentifier {
            kind: ResourceKind::Network,
            input: input.to_string(),
        }
    })?;

    let network = ResourceRef {
        name: caps[2].to_string(),
        project: caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        region: String::new(),
    };
    debug!("Parsed network {:?} => {:?}", input, &network);
    Ok(network)
}

/// Parse a subnetwork identifier by peeling `projects/P`, `regions/R` and `subnetworks/` off the front,
/// each only when the remaining segment count is exactly what that level expects.
pub fn parse_subnetwork(input: &str) -> Result<ResourceRef, ImportError> {
    if input.is_empty() {
        return Ok(ResourceRef::default());
    }

    let invalid = || ImportError::InvalidResourceIdentifier {
        kind: ResourceKind::Subnetwork,
        input: input.to_string(),
    };

    let segments: Vec<&str> = trim_resource_prefix(input).split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }

    let mut subnet = ResourceRef::default();
    let mut rest = segments.as_slice();
    if rest.len() == 6 && rest[0] == "projects" {
        subnet.project = rest[1].to_string();
        rest = &rest[2..];
    }
    if rest.len() == 4 && rest[0] == "regions" {
        subnet.region = rest[1].to_string();
        rest = &rest[2..];
    }
    if rest.len() == 2 && rest[0] == "subnetworks" {
        rest = &rest[1..];
    }

    match rest {
        [name] => {
            subnet.name = name.to_string();
            debug!("Parsed subnet {:?} => {:?}", input, &subnet);
            Ok(subnet)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to build expected answers briefly in the following test cases.
    fn net(project: &str, name: &str) -> ResourceRef {
        ResourceRef {
            name: name.to_string(),
            project: project.to_string(),
            region: String::new(),
        }
    }

    fn subnet(project: &str, region: &str, name: &str) -> ResourceRef {
        ResourceRef {
            name: name.to_string(),
            project: project.to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_trim_resource_prefix() {
        assert_eq!(
            trim_resource_prefix("https://compute.googleapis.com/compute/v1/projects/p/global/networks/n"),
            "projects/p/global/networks/n"
        );
        assert_eq!(
            trim_resource_prefix("https://www.googleapis.com/compute/v1/global/networks/n"),
            "global/networks/n"
        );
        assert_eq!(
            trim_resource_prefix("//compute.googleapis.com/compute/projects/p/global/networks/n"),
            "projects/p/global/networks/n"
        );
        assert_eq!(trim_resource_prefix("regions/r/subnetworks/s"), "regions/r/subnetworks/s");
        assert_eq!(trim_resource_prefix("https://compute.googleapis.com/compute/v1/"), "");
    }

    #[test]
    fn test_parse_network_accepted_forms() {
        let cases = [
            ("net-id", net("", "net-id")),
            ("global/networks/net-id", net("", "net-id")),
            ("projects/proj-id/global/networks/net-id", net("proj-id", "net-id")),
            (
                "https://www.googleapis.com/compute/v1/projects/proj-id/global/networks/net-id",
                net("proj-id", "net-id"),
            ),
            (
                "https://compute.googleapis.com/compute/v1/projects/proj-id/global/networks/net-id",
                net("proj-id", "net-id"),
            ),
            (
                "//compute.googleapis.com/compute/projects/proj-id/global/networks/net-id",
                net("proj-id", "net-id"),
            ),
            (
                "https://compute.googleapis.com/compute/v1/global/networks/net-id",
                net("", "net-id"),
            ),
            // The middle group is optional in the grammar.
            ("projects/proj-id/net-id", net("proj-id", "net-id")),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_network(input).unwrap(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_parse_network_round_trip() {
        for input in [
            "net-id",
            "global/networks/net-id",
            "projects/proj-id/global/networks/net-id",
            "https://compute.googleapis.com/compute/v1/projects/proj-id/global/networks/net-id",
            "//compute.googleapis.com/compute/global/networks/net-id",
        ] {
            let parsed = parse_network(input).unwrap();
            let canonical = parsed.network_path();
            assert_eq!(parse_network(&canonical).unwrap(), parsed, "input: {}", input);
            assert_eq!(parse_network(&canonical).unwrap().network_path(), canonical);
        }
    }

    #[test]
    fn test_parse_network_rejected_forms() {
        for input in [
            "networks/net-id",
            "project-id/global/networks/net-id",
            "//compute.googleapis.com/compute/v1/projects/proj-id/global/networks/net-id",
            "https://compute.googleapis.com/compute/projects/proj-id/global/networks/net-id",
            "https://compute.googleapis.com/compute/v1/",
        ] {
            let err = parse_network(input).unwrap_err();
            let msg = err.to_string();
            assert!(matches!(
                err,
                ImportError::InvalidResourceIdentifier {
                    kind: ResourceKind::Network,
                    ..
                }
            ));
            assert!(
                msg.contains(&format!("{:?} is not a valid network resource identifier", input)),
                "unexpected message: {}",
                msg
            );
            assert!(msg.ends_with(&format!("See {} for naming guidelines.", NAMING_GUIDELINES_URL)));
        }
    }

    #[test]
    fn test_parse_subnetwork_accepted_forms() {
        let cases = [
            ("sub-id", subnet("", "", "sub-id")),
            ("subnetworks/sub-id", subnet("", "", "sub-id")),
            ("regions/us-west2/subnetworks/sub-id", subnet("", "us-west2", "sub-id")),
            (
                "projects/proj-id/regions/us-west2/subnetworks/sub-id",
                subnet("proj-id", "us-west2", "sub-id"),
            ),
            (
                "https://www.googleapis.com/compute/v1/projects/proj-id/regions/us-west2/subnetworks/sub-id",
                subnet("proj-id", "us-west2", "sub-id"),
            ),
            (
                "//compute.googleapis.com/compute/regions/us-west2/subnetworks/sub-id",
                subnet("", "us-west2", "sub-id"),
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_subnetwork(input).unwrap(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_parse_subnetwork_segment_counts_are_strict() {
        for input in [
            "extra/garbage/projects/proj-id/regions/us-west2/subnetworks/sub-id",
            "projects/proj-id/subnetworks/sub-id",
            "regions/us-west2/sub-id",
            "subnet/sub-id",
            "regions/us-west2/subnetworks/",
            "https://compute.googleapis.com/compute/regions/us-west2/subnetworks/sub-id",
        ] {
            let msg = parse_subnetwork(input).unwrap_err().to_string();
            assert!(
                msg.starts_with(&format!("{:?} is not a valid subnet resource identifier", input)),
                "unexpected message: {}",
                msg
            );
        }
    }

    #[test]
    fn test_empty_input_is_absent() {
        assert_eq!(parse_network("").unwrap(), ResourceRef::default());
        assert_eq!(parse_subnetwork("").unwrap(), ResourceRef::default());
        assert_eq!(ResourceRef::default().network_path(), "");
        assert_eq!(ResourceRef::default().subnetwork_path(), "");
    }

    #[test]
    fn test_network_path() {
        assert_eq!(net("", "n").network_path(), "global/networks/n");
        assert_eq!(net("p", "n").network_path(), "projects/p/global/networks/n");
        assert_eq!(net("p", "").network_path(), "");
    }

    #[test]
    fn test_subnetwork_path() {
        assert_eq!(subnet("p", "r", "n").subnetwork_path(), "projects/p/regions/r/subnetworks/n");
        assert_eq!(subnet("", "r", "n").subnetwork_path(), "regions/r/subnetworks/n");
        assert_eq!(subnet("p", "", "n").subnetwork_path(), "n");
        assert_eq!(subnet("", "", "n").subnetwork_path(), "n");
        assert_eq!(subnet("p", "", "").subnetwork_path(), "");
    }

    #[test]
    fn test_subnetwork_path_is_idempotent() {
        for r in [
            subnet("p", "r", "n"),
            subnet("", "r", "n"),
            subnet("p", "", "n"),
            ResourceRef::default(),
        ] {
            let once = r.subnetwork_path();
            assert_eq!(parse_subnetwork(&once).unwrap().subnetwork_path(), once);
        }
    }
}
