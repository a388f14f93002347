// Diagnostics error taxonomy
//
// Malformed input is fatal to the sub-analysis that received it, never to
// sibling analyses. Resource exhaustion is fatal to the run and surfaced by
// the caller as a skipped section.

use thiserror::Error;

/// Errors raised while parsing a raw heap-snapshot document
#[derive(Error, Debug)]
pub enum MalformedSnapshotError {
    /// The document is not valid JSON
    #[error("snapshot is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required top-level section is absent
    #[error("missing required snapshot section: {0}")]
    MissingSection(&'static str),

    /// A required meta field name is absent from the field layout
    #[error("missing field '{field}' in {section} layout")]
    MissingField {
        /// Section whose layout is incomplete ("nodes" or "edges")
        section: &'static str,
        /// The absent field name
        field: &'static str,
    },

    /// The flat node array length is not a multiple of the declared layout
    #[error("node array length {actual} is not a multiple of field count {fields}")]
    NodeFieldMismatch {
        /// Declared fields per node
        fields: usize,
        /// Actual flat array length
        actual: usize,
    },

    /// The flat edge array length is not a multiple of the declared layout
    #[error("edge array length {actual} is not a multiple of field count {fields}")]
    EdgeFieldMismatch {
        /// Declared fields per edge
        fields: usize,
        /// Actual flat array length
        actual: usize,
    },

    /// Declared node count disagrees with the node array
    #[error("declared node count {declared} disagrees with parsed count {parsed}")]
    NodeCountMismatch {
        /// Count declared in the snapshot header
        declared: usize,
        /// Count derived from the node array
        parsed: usize,
    },

    /// Per-node edge counts disagree with the edge array
    #[error("nodes declare {declared} edges but the edge array holds {parsed}")]
    EdgeCountMismatch {
        /// Sum of per-node edge counts
        declared: usize,
        /// Count derived from the edge array
        parsed: usize,
    },

    /// An edge points outside the node array
    #[error("edge {edge_index} targets node offset {offset} outside the node array")]
    EdgeTargetOutOfRange {
        /// Index of the offending edge in document order
        edge_index: usize,
        /// The out-of-range offset
        offset: usize,
    },

    /// A string-table reference points outside the table
    #[error("string table index {0} out of range")]
    StringIndexOutOfRange(usize),

    /// A non-integer value appeared where the flat arrays require one
    #[error("non-integer value at {section} offset {offset}")]
    NonIntegerField {
        /// Array containing the bad value
        section: &'static str,
        /// Flat offset of the bad value
        offset: usize,
    },

    /// A non-string value appeared in a string table or field layout
    #[error("non-string value at {section} offset {offset}")]
    NonStringField {
        /// Array containing the bad value
        section: &'static str,
        /// Offset of the bad value
        offset: usize,
    },

    /// Chunked capture ended with a gap in the sequence
    #[error("capture {capture_id} is missing chunk {missing} of {total}")]
    IncompleteChunks {
        /// Capture the chunks belong to
        capture_id: String,
        /// First missing sequence number
        missing: u32,
        /// Total chunks expected
        total: u32,
    },
}

/// Errors raised by the diagnostics engine
#[derive(Error, Debug)]
pub enum DiagError {
    /// The heap-snapshot document could not be parsed
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] MalformedSnapshotError),

    /// A heap-graph edge references a node id that does not exist
    #[error("malformed heap graph: edge {edge_index} references missing node {node_id}")]
    MalformedGraph {
        /// Index of the dangling edge
        edge_index: usize,
        /// The unresolved node id
        node_id: u64,
    },

    /// Baseline and candidate images have different dimensions
    #[error(
        "image dimensions differ: baseline {baseline_width}x{baseline_height}, \
         candidate {candidate_width}x{candidate_height}"
    )]
    DimensionMismatch {
        /// Baseline width in pixels
        baseline_width: u32,
        /// Baseline height in pixels
        baseline_height: u32,
        /// Candidate width in pixels
        candidate_width: u32,
        /// Candidate height in pixels
        candidate_height: u32,
    },

    /// A pixel buffer does not match its declared dimensions
    #[error("invalid pixel buffer: {width}x{height} rgba needs {expected} bytes, got {actual}")]
    InvalidPixelBuffer {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Bytes required by the declared dimensions
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// A snapshot exceeded the configured memory budget
    #[error("snapshot exceeds memory budget: {needed} bytes needed, budget is {budget}")]
    ResourceExhausted {
        /// Configured budget in bytes
        budget: usize,
        /// Bytes the operation would have needed
        needed: usize,
    },

    /// Timeline samples must be strictly increasing by timestamp
    #[error("timeline timestamps must be strictly increasing ({prev_ms}ms then {next_ms}ms)")]
    NonMonotonicTimeline {
        /// Timestamp of the previously accepted sample
        prev_ms: u64,
        /// Timestamp of the rejected sample
        next_ms: u64,
    },
}
