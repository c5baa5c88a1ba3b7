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
use std::env;
use std::error::Error;
use std::process::Command;

pub const PROJECT_KEY: &str = "core/project";
pub const REGION_KEY: &str = "compute/region";

/// Returns the explicit value when given, otherwise `gcloud config get <key>`.
pub fn value_or_config(explicit: Option<&str>, key: &str) -> Result<String, Box<dyn Error>> {
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }

    let value = run(&["config", "get", key])?;
    if value.is_empty() {
        return Err(missing_config_message(key).into());
    }
    debug!("Autofilled {} from gcloud config => {:?}", key, &value);
    Ok(value)
}

/// Access token of the active gcloud account, used as the bearer token for API calls.
pub fn access_token() -> Result<String, Box<dyn Error>> {
    let token = run(&["auth", "print-access-token"])?;
    if token.is_empty() {
        return Err("No access token from gcloud. Consider: 'gcloud auth login'".into());
    }
    Ok(token)
}

/// Trimmed stdout of `gcloud <args>`.
fn run(args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = Command::new("gcloud")
        .args(args)
        .env("PATH", env::var("PATH")?)
        .output()?;
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

fn missing_config_message(key: &str) -> String {
    format!(
        "No '{}' found in gcloud config. Consider: 'gcloud config set {} {}', or pass it explicitly",
        key,
        key,
        key.rsplit('/').next().unwrap_or("").to_uppercase()
    )
}
