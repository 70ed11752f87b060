use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wca_lib::{
    assess_claim, AssessmentOutput, ClaimRequest, Config, HttpFetcher, ValidateOutput,
    VisionClient, WcaError, WcaOutput, WCA_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};

/// Run the assess command: parse the claim, drive the pipeline, emit the
/// assessment envelope.
pub async fn run_assess(
    config_path: Option<PathBuf>,
    verbose: bool,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    concurrency: Option<usize>,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    if let Some(concurrency) = concurrency {
        config.concurrency = concurrency;
    }
    if let Err(err) = config.validate() {
        return render_error(err, format, output);
    }

    let request = match read_request(input.as_deref()) {
        Ok(request) => request,
        Err(err) => return render_error(err, format, output),
    };

    if verbose {
        eprintln!(
            "Effective config: concurrency={}, dhash_threshold={}, phash_threshold={}, max_candidates={}, fetch_timeout={}s",
            config.concurrency,
            config.dhash_threshold,
            config.phash_threshold,
            config.max_candidates,
            config.fetch_timeout_secs
        );
        eprintln!(
            "Assessing claim {} ({} images)\u{2026}",
            request.claim_id,
            request.images.len()
        );
    }

    let fetcher = match HttpFetcher::with_timeout(config.fetch_timeout()) {
        Ok(fetcher) => fetcher,
        Err(err) => return render_error(err, format, output),
    };
    let classifier = VisionClient::from_settings(&config.vision);

    let report = assess_claim(
        &request.images,
        &fetcher,
        &classifier,
        &config.pipeline_options(),
    )
    .await;

    if verbose {
        eprintln!(
            "Analyzed {}/{} images into {} clusters",
            report.source_images.analyzed,
            report.source_images.total,
            report.source_images.clusters
        );
    }

    let body = WcaOutput::Assess(AssessmentOutput::new(request.claim_id, report));
    match write_output(&body, format, output.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, format, None),
    }
}

/// Run the validate command: parse and check the claim payload only.
pub fn run_validate(verbose: bool, input: Option<PathBuf>) -> ExitCode {
    let request = match read_request(input.as_deref()) {
        Ok(request) => request,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };

    if verbose {
        eprintln!("Claim {} passed validation", request.claim_id);
    }

    let body = WcaOutput::Validate(ValidateOutput {
        version: WCA_OUTPUT_VERSION.to_string(),
        valid: true,
        claim_id: request.claim_id,
        image_count: request.images.len(),
    });
    match write_output(&body, OutputFormat::Json, None) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, OutputFormat::Json, None),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, WcaError> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Read the claim request from a file, or stdin when no path is given.
fn read_request(input: Option<&Path>) -> Result<ClaimRequest, WcaError> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            WcaError::Request(format!("failed to read input {}: {e}", path.display()))
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| WcaError::Request(format!("failed to read stdin: {e}")))?;
            buf
        }
    };
    ClaimRequest::from_json(&raw)
}
