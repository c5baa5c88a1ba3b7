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

use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use tokio_util::sync::CancellationToken;

mod error;
mod gcloud;
mod gcs;
mod import_args;
mod resource_ref;
mod scratch;
mod storage_path;

#[derive(Parser)]
#[command(name = "gce-import-guard")]
#[command(version, about)]
struct Cli {
    /// Activate debug mode to see more detailed logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Normalize a --network value into the path Compute Engine expects (alias: net).
    #[clap(aliases = &["net"])]
    Network(NetworkCmdArgs),

    /// Normalize a --subnet value into the path Compute Engine expects (alias: subnetwork).
    #[clap(aliases = &["subnetwork"])]
    Subnet(SubnetCmdArgs),

    /// Check that a scratch bucket belongs to the import project.
    ///
    /// On a mismatch, a source file that sits inside the scratch directory is deleted so it isn't left behind in a bucket you don't control.
    CheckScratch(CheckScratchArgs),
}

#[derive(Args, Debug)]
struct NetworkCmdArgs {
    /// Network name, path (e.g., 'global/networks/default'), or full API URL.
    input: String,

    /// Project to qualify the network with when the input has none. Defaults to gcloud 'core/project'.
    #[arg(long)]
    project: Option<String>,
}

#[derive(Args, Debug)]
struct SubnetCmdArgs {
    /// Subnet name, path (e.g., 'regions/us-west2/subnetworks/sub'), or full API URL.
    input: String,

    /// Defaults to gcloud 'core/project'.
    #[arg(long)]
    project: Option<String>,

    /// Defaults to gcloud 'compute/region'.
    #[arg(long)]
    region: Option<String>,
}

#[derive(Args, Debug)]
struct CheckScratchArgs {
    /// Scratch location (e.g., 'gs://bucket/dir/').
    #[arg(long)]
    scratch: String,

    /// File being imported (e.g., 'gs://bucket/dir/disk.vmdk'). Omit when importing from an existing image.
    #[arg(long)]
    source: Option<String>,

    /// Project running the import. Defaults to gcloud 'core/project'.
    #[arg(long)]
    project: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Cmd::Network(args) => network(args),
        Cmd::Subnet(args) => subnet(args),
        Cmd::CheckScratch(args) => check_scratch(args).await,
    }
    .map_err(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn network(args: &NetworkCmdArgs) -> Result<(), Box<dyn Error>> {
    let mut net_args = import_args::NetworkArgs {
        network: args.input.clone(),
        subnet: String::new(),
    };
    import_args::populate_network(
        &mut net_args,
        || gcloud::value_or_config(args.project.as_deref(), gcloud::PROJECT_KEY),
        || Ok(String::new()),
    )?;
    println!("{}", net_args.network);
    Ok(())
}

fn subnet(args: &SubnetCmdArgs) -> Result<(), Box<dyn Error>> {
    let mut net_args = import_args::NetworkArgs {
        network: String::new(),
        subnet: args.input.clone(),
    };
    import_args::populate_network(
        &mut net_args,
        || gcloud::value_or_config(args.project.as_deref(), gcloud::PROJECT_KEY),
        || gcloud::value_or_config(args.region.as_deref(), gcloud::REGION_KEY),
    )?;
    println!("{}", net_args.subnet);
    Ok(())
}

async fn check_scratch(args: &CheckScratchArgs) -> Result<(), Box<dyn Error>> {
    let project = gcloud::value_or_config(args.project.as_deref(), gcloud::PROJECT_KEY)?;
    let staging = scratch::StagingLocation {
        uri: args.scratch.clone(),
    };
    let source = args
        .source
        .as_ref()
        .map(|uri| scratch::SourceFile { uri: uri.clone() });

    let client = gcs::GcsClient::new()?;

    // Ctrl-C aborts the in-flight lookup or delete
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    scratch::verify_ownership(
        &project,
        &staging,
        source.as_ref(),
        &client,
        &client,
        &cancel,
    )
    .await?;

    info!("Scratch bucket {} is in project {}", &args.scratch, &project);
    Ok(())
}
