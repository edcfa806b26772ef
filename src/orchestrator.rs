//! Progressive analysis orchestrator
//!
//! Drives batches through prompt composition and the inference backend in
//! strict order, one in flight at a time. Each batch's prompt depends on
//! the previous batch's result, so the loop cannot be parallelized.
//!
//! The clinical context is REPLACED by each successful result, not
//! appended to: later batches only ever see the single most recent result.

use crate::batching::Batch;
use crate::client::{ContentPart, InferenceBackend};
use crate::error::AnalysisError;
use crate::ledger::{LedgerEntry, ProgressLedger};
use crate::prompts::{compose_prompt, BatchPosition};
use base64::Engine;

/// Sequential driver for a planned set of batches.
pub struct ProgressiveAnalyzer<'a, B> {
    backend: &'a B,
    ledger: ProgressLedger,
    max_output_tokens: u32,
}

impl<'a, B: InferenceBackend> ProgressiveAnalyzer<'a, B> {
    pub fn new(backend: &'a B, ledger: ProgressLedger, max_output_tokens: u32) -> Self {
        Self {
            backend,
            ledger,
            max_output_tokens,
        }
    }

    /// Run every batch and return the final clinical context.
    ///
    /// A terminal failure on the first batch aborts the run: with no prior
    /// result there is nothing to report. A terminal failure on any later
    /// batch is logged and skipped; the context from the last success
    /// carries into the next batch and that batch's findings are simply
    /// absent from the final report.
    pub async fn run(
        mut self,
        batches: &[Batch],
        total_images: usize,
    ) -> Result<String, AnalysisError> {
        let mut clinical_context = String::new();
        let mut processed = 0usize;
        let total_batches = batches.len();

        for (index, batch) in batches.iter().enumerate() {
            processed += batch.len();
            let position = BatchPosition {
                index,
                total_batches,
                batch_size: batch.len(),
                total_images,
                processed,
            };
            let (start, end) = position.slice_range();

            tracing::info!(
                "analyzing batch {}/{} (slices {} to {} of {}, ~{} base64 bytes)",
                index + 1,
                total_batches,
                start,
                end,
                total_images,
                batch.estimated_bytes
            );

            let parts = self.encode_batch(batch, &position, &clinical_context).await?;

            match self.backend.generate(parts, self.max_output_tokens).await {
                Ok(result) => {
                    clinical_context = result;
                    let entry = LedgerEntry {
                        index,
                        total_batches,
                        slice_start: start,
                        slice_end: end,
                        text: &clinical_context,
                    };
                    if let Err(err) = self.ledger.record(&entry) {
                        tracing::warn!(
                            "could not append batch {} to ledger at {}: {}",
                            index + 1,
                            self.ledger.path().display(),
                            err
                        );
                    }
                    tracing::info!("batch {}/{} integrated", index + 1, total_batches);
                }
                Err(err) => {
                    if clinical_context.is_empty() {
                        // No successful batch yet: nothing to build a
                        // report from, abort the whole run.
                        return Err(AnalysisError::Inference {
                            batch: index + 1,
                            source: err,
                        });
                    }
                    tracing::error!(
                        "batch {}/{} failed terminally, its findings will be absent \
                         from the final report: {}",
                        index + 1,
                        total_batches,
                        err
                    );
                }
            }
        }

        Ok(clinical_context)
    }

    /// Encode every image in the batch and append the stage instruction.
    /// Encoding happens on demand here; the planner's size estimate is
    /// never used to gate it.
    async fn encode_batch(
        &self,
        batch: &Batch,
        position: &BatchPosition,
        clinical_context: &str,
    ) -> Result<Vec<ContentPart>, AnalysisError> {
        let mut parts = Vec::with_capacity(batch.len() + 1);
        for image in &batch.images {
            let data = tokio::fs::read(&image.path)
                .await
                .map_err(|source| AnalysisError::Encoding {
                    path: image.path.clone(),
                    source,
                })?;
            let payload = base64::engine::general_purpose::STANDARD.encode(&data);
            parts.push(ContentPart::image_data_url(&image.mime, &payload));
        }
        parts.push(ContentPart::text(compose_prompt(position, clinical_context)));
        Ok(parts)
    }
}
