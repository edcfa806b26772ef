//! Runtime configuration for the analysis pipeline.

/// Configuration for one analysis run.
///
/// Built once from CLI arguments and environment, then passed by reference
/// into the client and orchestrator. No module-level state.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Full URL of the inference endpoint's predict route.
    pub endpoint_url: String,

    /// Bearer token for the endpoint.
    pub api_token: String,

    /// Maximum total base64-encoded image bytes per request.
    pub max_payload_bytes: u64,

    /// Maximum tokens the model may generate per batch.
    pub max_output_tokens: u32,

    /// Sampling temperature. Kept low so successive batches stay on the
    /// same register and the threaded context remains usable.
    pub temperature: f32,
}

/// Default payload ceiling: 3.5 MB of base64 text per request.
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = (3.5 * 1024.0 * 1024.0) as u64;

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            api_token: String::new(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_output_tokens: 8192,
            temperature: 0.1,
        }
    }
}
