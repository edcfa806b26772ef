//! Stage-dependent prompt composition
//!
//! Each batch gets one instruction keyed to where it sits in the study:
//! the opening batch starts from nothing, middle batches continue from the
//! prior result, and the closing batch consolidates into a structured
//! report. The prior result is injected verbatim; only the single most
//! recent result is carried, not the full history.

/// Where a batch sits within the planned sequence.
#[derive(Debug, Clone, Copy)]
pub struct BatchPosition {
    /// 0-based batch index.
    pub index: usize,
    pub total_batches: usize,
    /// Number of slices in this batch.
    pub batch_size: usize,
    /// Total slices across the whole study.
    pub total_images: usize,
    /// Slices processed once this batch completes (cumulative, 1-based).
    pub processed: usize,
}

impl BatchPosition {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total_batches
    }

    /// 1-based slice range covered by this batch.
    pub fn slice_range(&self) -> (usize, usize) {
        (self.processed - self.batch_size + 1, self.processed)
    }
}

/// Build the instruction for one batch given the current clinical context.
///
/// A run with a single batch takes the first-batch form: there is no prior
/// context to consolidate, so the open-ended instruction applies.
pub fn compose_prompt(position: &BatchPosition, clinical_context: &str) -> String {
    let (start, end) = position.slice_range();

    if position.is_first() {
        format!(
            "THIS IS THE START OF A COMPLETE RADIOLOGICAL ANALYSIS OF A CT STUDY. \
             You are a senior consultant radiologist. \
             Analyze the FIRST slices ({start} to {end} of {total}). \
             Report absolutely everything that is visible: parenchymal changes, \
             soft tissues, vascular and skeletal structures, and any incidental \
             finding or subtle anatomical variant, however small. \
             Your answer must be an exhaustive clinical findings base for the \
             slices shown. Leave nothing out.",
            total = position.total_images,
        )
    } else if position.is_last() {
        format!(
            "THIS IS THE FINAL PART AND CONSOLIDATION OF A LONG ANALYSIS.\n\n\
             === CLINICAL FINDINGS ACCUMULATED IN PREVIOUS PARTS ===\n\
             {clinical_context}\n\
             === END OF PRIOR MEMORY ===\n\n\
             Analyze the LAST slices ({start} to {end} of {total}) and produce \
             the FINAL REPORT with these sections:\n\
             1. TECHNIQUE AND PROTOCOL\n\
             2. FINDINGS BY SYSTEM (exhaustive account of all visible anatomy)\n\
             3. ANOMALIES AND INCIDENTAL FINDINGS\n\
             4. FINAL DIAGNOSTIC IMPRESSION\n\
             5. RECOMMENDATIONS AND CLINICAL CLASSIFICATIONS\n\n\
             Leave nothing behind. Use precise technical language.",
            total = position.total_images,
        )
    } else {
        format!(
            "THIS IS THE CONTINUATION OF AN ANALYSIS IN PROGRESS. IT IS NOT A NEW STUDY.\n\n\
             === CLINICAL MEMORY FROM PREVIOUS PARTS ===\n\
             {clinical_context}\n\
             === END OF PRIOR MEMORY ===\n\n\
             Now analyze slices {start} to {end} of {total}. \
             Your task is to CONTINUE AND EXPAND the clinical findings. \
             Combine what has already been seen with these new slices, and if \
             anything new appears in any structure, report it exhaustively.",
            total = position.total_images,
        )
    }
}
