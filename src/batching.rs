//! Payload-bounded batch planning
//!
//! Greedy single-pass packing of the ordered slice sequence into batches
//! whose estimated base64 size stays under the request payload limit.

use crate::discovery::ImageRef;

/// An ordered, non-empty group of slices sent in one inference request.
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: Vec<ImageRef>,
    /// Sum of the estimated encoded sizes of `images`.
    pub estimated_bytes: u64,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Partition `images` into payload-bounded batches, preserving order.
///
/// A batch is closed when the next image would push it over `limit`. An
/// image whose own estimate exceeds the limit still ships, alone in its
/// own batch: a single slice cannot be split, and dropping it would leave
/// a hole in the study.
pub fn plan_batches(images: Vec<ImageRef>, limit: u64) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut current_size = 0u64;

    for image in images {
        let estimate = image.estimated_encoded_len();
        if !current.is_empty() && current_size + estimate > limit {
            batches.push(Batch {
                images: std::mem::take(&mut current),
                estimated_bytes: current_size,
            });
            current_size = 0;
        }
        current.push(image);
        current_size += estimate;
    }

    if !current.is_empty() {
        batches.push(Batch {
            images: current,
            estimated_bytes: current_size,
        });
    }
    batches
}
