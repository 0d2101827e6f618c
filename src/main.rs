// Copyright 2025 Kirky.X
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

use anyhow::{bail, Context};
use chrono::Utc;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use seisbatch::batch::{BatchClient, BatchSettings, ProgressBar};
use seisbatch::config::settings::Settings;
use seisbatch::domain::models::standard::Standard;
use seisbatch::engines::reqwest_engine::ReqwestTransportFactory;
use seisbatch::infrastructure::io::json_file::read_request_parameters;
use seisbatch::infrastructure::io::report::BatchReport;
use seisbatch::infrastructure::io::samples::write_sample_file;
use seisbatch::infrastructure::io::{check_request_files, supported_file_types_table};
use seisbatch::infrastructure::observability::metrics::describe_metrics;
use seisbatch::utils::errors::BatchError;
use seisbatch::utils::telemetry;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(
    name = "seisbatch",
    version,
    about = "Batch request of seismic design parameters from the USGS design maps service.",
    long_about = "Reads a list of parameters from an input file, requests the seismic \
parameters from the design maps service and writes the responses to an output file. \
File types are detected by their extension.\n\nFor more information on seismic design maps visit:\n\
https://earthquake.usgs.gov/ws/designmaps/",
    arg_required_else_help = true
)]
#[command(group(
    ArgGroup::new("command")
        .required(true)
        .args(["request", "sample", "list_refdocs", "input_filetypes"])
))]
struct Cli {
    /// Force overwriting of existing files
    #[arg(short, long = "force-overwrite")]
    force_overwrite: bool,

    /// Alternative base URL, the part before 'asce...' or 'ibc...'
    #[arg(short, long = "base-url", value_name = "BASE_URL")]
    base_url: Option<String>,

    /// Read parameters of input file, request seismic parameters and write to output file
    #[arg(short, long, num_args = 2, value_names = ["INPUT_FILE", "OUTPUT_FILE"])]
    request: Option<Vec<PathBuf>>,

    /// Write a sample input file (type detected by extension)
    #[arg(short, long, value_name = "FILE")]
    sample: Option<PathBuf>,

    /// List all supported reference documents
    #[arg(short = 'l', long = "list-refdocs")]
    list_refdocs: bool,

    /// List all supported input file types
    #[arg(short = 't', long = "input-filetypes")]
    input_filetypes: bool,
}

/// 主函数
///
/// 解析命令行并执行对应的命令，错误按类别输出
#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_telemetry();
    describe_metrics();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) if e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
        Err(e) => {
            eprintln!("Command line error:");
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::new().context("Failed to load configuration")?;

    if cli.list_refdocs {
        list_reference_documents(&settings.client.base_url);
        return Ok(());
    }
    if cli.input_filetypes {
        println!("{}", supported_file_types_table());
        return Ok(());
    }
    if let Some(path) = &cli.sample {
        write_sample_file(path, cli.force_overwrite).await?;
        println!("Wrote sample input file to \"{}\"", path.display());
        return Ok(());
    }
    if let Some(files) = &cli.request {
        let [input, output] = files.as_slice() else {
            bail!("expected INPUT_FILE and OUTPUT_FILE for [-r, --request]");
        };
        let base_url = cli.base_url.as_deref().unwrap_or_default();
        return request_from_server(&settings, input, output, base_url, cli.force_overwrite).await;
    }

    bail!("no command given")
}

fn list_reference_documents(base_url: &str) {
    println!("{:<10} {}", "RefDoc", "URL");
    println!("{}", "-".repeat(40));
    for standard in Standard::all() {
        println!("{:<10} {}", standard.name(), standard.doc_url(base_url));
    }
}

async fn request_from_server(
    settings: &Settings,
    input: &Path,
    output: &Path,
    base_url: &str,
    force_overwrite: bool,
) -> anyhow::Result<()> {
    check_request_files(input, output, force_overwrite)?;

    println!("Reading {}", input.display());
    let parameters = read_request_parameters(input).await?;

    let client = BatchClient::with_settings(
        ReqwestTransportFactory::new(),
        BatchSettings::from(&settings.client),
    );
    let base_url = client.resolve_base_url(base_url)?;
    println!(
        "Requesting {} parameter sets from {}",
        parameters.len(),
        base_url
    );

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, cancelling batch");
                cancel.cancel();
            }
        })
    };

    let progress_bar = ProgressBar::new(settings.output.progress_bar_width)?;
    let requested_at = Utc::now();
    let outcome = client
        .run_batch(&parameters, base_url.as_str(), &cancel, &progress_bar)
        .await;
    ctrl_c.abort();

    let result = match outcome {
        Ok(result) => result,
        Err(BatchError::Cancelled) => {
            warn!("Batch cancelled by user");
            println!("WARNING: request cancelled, nothing was written");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let failed = result.failed_count();
    BatchReport::new(base_url.as_str(), requested_at, result)
        .write(output, settings.output.pretty, force_overwrite)
        .await?;

    if failed > 0 {
        println!("WARNING: {} request(s) failed!", failed);
    }
    println!("Wrote server response to \"{}\"", output.display());
    Ok(())
}

/// 按错误类别输出
fn report_error(error: &anyhow::Error) {
    let heading = match error.downcast_ref::<BatchError>() {
        Some(BatchError::FileOverwrite(_)) => {
            "Detected existing file: use [-f, --force-overwrite] to overwrite"
        }
        Some(
            BatchError::InvalidParameter(_)
            | BatchError::InvalidBaseUrl { .. }
            | BatchError::SameFile(_)
            | BatchError::UnsupportedFileType(_),
        ) => "Invalid value(s) or parameter(s):",
        Some(BatchError::FileNotFound(_) | BatchError::DirectoryNotFound(_)) => {
            "File does not exist:"
        }
        Some(BatchError::ServerRequest { .. }) => "Connection error:",
        _ => "Unclassified error:",
    };

    eprintln!("{}", heading);
    for (depth, cause) in error.chain().enumerate() {
        eprintln!("{}{}", "   ".repeat(depth + 1), cause);
    }
}
