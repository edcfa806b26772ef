//! Command-line arguments.

use crate::config::AnalyzerConfig;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "radreport")]
#[command(about = "Progressive CT-scan analysis against a remote multimodal inference endpoint")]
#[command(version)]
pub struct CliArgs {
    /// Path to a ZIP archive or a directory of CT slice images
    pub input: PathBuf,

    /// Full URL of the inference endpoint's predict route
    #[arg(long, env = "RADREPORT_ENDPOINT_URL")]
    pub endpoint_url: String,

    /// Bearer token for the endpoint
    #[arg(long, env = "RADREPORT_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Maximum total base64 image payload per request, in megabytes
    #[arg(long, default_value_t = 3.5)]
    pub max_payload_mb: f64,

    /// Maximum tokens the model may generate per batch
    #[arg(long, default_value_t = 8192)]
    pub max_output_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.1)]
    pub temperature: f32,

    /// Path for the final report (defaults to ct_analysis_report.txt next to the input)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path for the incremental batch ledger
    #[arg(long, default_value = "progressive_report.txt")]
    pub ledger: PathBuf,
}

impl CliArgs {
    pub fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            endpoint_url: self.endpoint_url.clone(),
            api_token: self.api_token.clone(),
            max_payload_bytes: (self.max_payload_mb * 1024.0 * 1024.0) as u64,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .join("ct_analysis_report.txt")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec![
            "radreport",
            "study.zip",
            "--endpoint-url",
            "https://example.test/predict",
            "--api-token",
            "secret",
        ];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = args.config();
        assert_eq!(config.max_payload_bytes, (3.5 * 1024.0 * 1024.0) as u64);
        assert_eq!(config.max_output_tokens, 8192);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(args.ledger, PathBuf::from("progressive_report.txt"));
    }

    #[test]
    fn test_report_path_next_to_input() {
        let mut args = parse(&[]);
        args.input = PathBuf::from("/data/studies/chest.zip");
        assert_eq!(
            args.report_path(),
            PathBuf::from("/data/studies/ct_analysis_report.txt")
        );

        args.input = PathBuf::from("chest.zip");
        assert_eq!(args.report_path(), PathBuf::from("./ct_analysis_report.txt"));

        args.output = Some(PathBuf::from("/tmp/out.txt"));
        assert_eq!(args.report_path(), PathBuf::from("/tmp/out.txt"));
    }
}
