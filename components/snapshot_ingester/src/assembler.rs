//! Chunked snapshot reassembly
//!
//! Heap-snapshot captures stream in as multiple fragments and may arrive out
//! of order. The assembler buffers fragments per capture id and concatenates
//! them in sequence order once the capture is finished, enforcing the
//! snapshot memory budget while buffering.

use dashmap::DashMap;
use diag_types::{CaptureId, DiagError, MalformedSnapshotError};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
struct ChunkBuffer {
    /// Fragments keyed by sequence number; BTreeMap keeps them ordered
    chunks: BTreeMap<u32, Vec<u8>>,
    bytes: usize,
}

/// Reassembles chunked snapshot captures
#[derive(Debug)]
pub struct SnapshotAssembler {
    buffers: DashMap<CaptureId, ChunkBuffer>,
    max_snapshot_bytes: usize,
}

impl SnapshotAssembler {
    /// Create an assembler enforcing the given per-capture byte budget
    pub fn new(max_snapshot_bytes: usize) -> Self {
        Self {
            buffers: DashMap::new(),
            max_snapshot_bytes,
        }
    }

    /// Buffer one fragment of a capture
    ///
    /// Fragments may arrive in any order; sequence numbers start at zero.
    /// A duplicate sequence number overwrites the earlier fragment.
    pub fn add_chunk(
        &self,
        capture: CaptureId,
        sequence: u32,
        data: Vec<u8>,
    ) -> Result<(), DiagError> {
        let mut buffer = self.buffers.entry(capture).or_default();

        let replaced = buffer.chunks.get(&sequence).map(Vec::len).unwrap_or(0);
        let needed = buffer.bytes - replaced + data.len();
        if needed > self.max_snapshot_bytes {
            return Err(DiagError::ResourceExhausted {
                budget: self.max_snapshot_bytes,
                needed,
            });
        }

        buffer.bytes = needed;
        buffer.chunks.insert(sequence, data);
        Ok(())
    }

    /// Finish a capture, yielding the reassembled document
    ///
    /// Fails when the sequence has a gap or the capture id is unknown; the
    /// buffered fragments are consumed either way.
    pub fn finish(&self, capture: CaptureId) -> Result<Vec<u8>, DiagError> {
        let (_, buffer) = self.buffers.remove(&capture).ok_or_else(|| {
            DiagError::MalformedSnapshot(MalformedSnapshotError::IncompleteChunks {
                capture_id: capture.to_string(),
                missing: 0,
                total: 0,
            })
        })?;

        let total = buffer.chunks.len() as u32;
        for (expected, &actual) in buffer.chunks.keys().enumerate() {
            if actual != expected as u32 {
                return Err(DiagError::MalformedSnapshot(
                    MalformedSnapshotError::IncompleteChunks {
                        capture_id: capture.to_string(),
                        missing: expected as u32,
                        total,
                    },
                ));
            }
        }

        debug!(
            "reassembled capture {}: {} chunks, {} bytes",
            capture, total, buffer.bytes
        );

        let mut document = Vec::with_capacity(buffer.bytes);
        for chunk in buffer.chunks.into_values() {
            document.extend_from_slice(&chunk);
        }
        Ok(document)
    }

    /// Drop a capture's buffered fragments without assembling them
    pub fn discard(&self, capture: CaptureId) {
        self.buffers.remove(&capture);
    }

    /// Number of captures currently buffering
    pub fn pending(&self) -> usize {
        self.buffers.len()
    }
}
