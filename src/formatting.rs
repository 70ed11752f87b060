use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wca_lib::{ErrorOutput, WcaError, WcaOutput, WCA_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Write output in the requested format to a file or stdout.
pub fn write_output(
    body: &WcaOutput,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), WcaError> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string(body)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(body)?,
    };
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{content}"),
    }
    Ok(())
}

/// Render an error payload and return the appropriate exit code.
///
/// Request/config problems exit 2; unexpected faults exit 1.
pub fn render_error(err: WcaError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let code = ExitCode::from(exit_code_for(&err));
    let payload = WcaOutput::Error(ErrorOutput {
        version: WCA_OUTPUT_VERSION.to_string(),
        error: err.to_payload(),
    });

    let content = match format {
        OutputFormat::Json => serde_json::to_string(&payload),
        OutputFormat::Pretty => serde_json::to_string_pretty(&payload),
    }
    .unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());

    match output {
        Some(path) => {
            if let Err(write_err) = std::fs::write(&path, &content) {
                eprintln!("Failed to write error output: {write_err}");
                println!("{content}");
            }
        }
        None => println!("{content}"),
    }

    code
}

pub fn exit_code_for(err: &WcaError) -> u8 {
    match err {
        WcaError::Request(_) | WcaError::Config(_) | WcaError::Io(_) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_exit_two() {
        let err = WcaError::Request("images cannot be empty".to_string());
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn config_errors_map_to_exit_two() {
        let err = WcaError::Config("concurrency must be at least 1".to_string());
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn unexpected_errors_map_to_exit_one() {
        let err = WcaError::Unknown("invariant violated".to_string());
        assert_eq!(exit_code_for(&err), 1);
    }
}
