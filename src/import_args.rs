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

use super::error::ImportError;
use super::resource_ref::{parse_network, parse_subnetwork};

/// Network used when neither --network nor --subnet is given.
pub const DEFAULT_NETWORK: &str = "default";

/// User-supplied --network and --subnet values. Empty means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkArgs {
    pub network: String,
    pub subnet: String,
}

/// Rewrites --network and --subnet into canonical paths, filling in the import's project and region
/// where the user left them out.
///
/// `project` and `region` are only called when a value is actually missing, and each at most once.
pub fn populate_network<E, P, R>(
    args: &mut NetworkArgs,
    mut project: P,
    region: R,
) -> Result<(), E>
where
    E: From<ImportError>,
    P: FnMut() -> Result<String, E>,
    R: FnOnce() -> Result<String, E>,
{
    let mut default_project: Option<String> = None;
    let mut fill_project = |slot: &mut String| -> Result<(), E> {
        if slot.is_empty() {
            if default_project.is_none() {
                default_project = Some(project()?);
            }
            *slot = default_project.clone().unwrap_or_default();
        }
        Ok(())
    };

    if args.network.is_empty() && args.subnet.is_empty() {
        args.network = DEFAULT_NETWORK.to_string();
    }

    if !args.subnet.is_empty() {
        let mut subnet = parse_subnetwork(&args.subnet)?;
        fill_project(&mut subnet.project)?;
        if subnet.region.is_empty() {
            subnet.region = region()?;
        }
        args.subnet = subnet.subnetwork_path();
    }

    if !args.network.is_empty() {
        let mut network = parse_network(&args.network)?;
        fill_project(&mut network.project)?;
        args.network = network.network_path();
    }

    debug!("Populated network args: {:?}", args);
    Ok(())
}
