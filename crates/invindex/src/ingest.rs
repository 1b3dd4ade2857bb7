//! JSON ingestion boundary.
//!
//! These types describe the wire shape postings arrive in from outside
//! the crate. They own no I/O: callers read bytes from wherever they
//! like (a file, a socket, a test fixture) and hand `serde_json` the
//! bytes; this module only defines what the result should look like and
//! how to turn it into [`TermPosting`]s ready for [`Segment::bulk_index`].

use crate::segment::TermPosting;
use serde::Deserialize;

/// One posting as it appears in a JSON ingestion payload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JsonPosting {
    /// The term this posting belongs to.
    pub term: String,
    /// The document this posting occurs in.
    pub doc_id: u32,
    /// The term's frequency within that document.
    pub term_frequency: f32,
}

impl From<JsonPosting> for TermPosting {
    fn from(p: JsonPosting) -> Self {
        TermPosting::new(p.term, p.doc_id, p.term_frequency)
    }
}

/// The top-level ingestion envelope: one postings list per segment,
/// `{"segments":[[{term,doc_id,term_frequency}, ...], ...]}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SegmentPostings {
    /// Each element is the ordered posting batch for one segment.
    pub segments: Vec<Vec<JsonPosting>>,
}

impl SegmentPostings {
    /// Parse a `SegmentPostings` envelope from a JSON byte slice.
    pub fn from_json(bytes: &[u8]) -> crate::error::Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            crate::error::InvError::MalformedEncoding(format!("invalid ingestion json: {e}"))
        })
    }

    /// Consume this envelope, yielding one [`TermPosting`] batch per
    /// segment, in order, each ready for
    /// [`crate::segment::Segment::bulk_index`].
    pub fn into_term_postings(self) -> Vec<Vec<TermPosting>> {
        self.segments
            .into_iter()
            .map(|postings| postings.into_iter().map(TermPosting::from).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_envelope() {
        let json = r#"{
            "segments": [
                [
                    {"term": "anakin", "doc_id": 1, "term_frequency": 1.0},
                    {"term": "anakin", "doc_id": 2, "term_frequency": 3.5}
                ],
                [
                    {"term": "vader", "doc_id": 3, "term_frequency": 2.0}
                ]
            ]
        }"#;
        let envelope = SegmentPostings::from_json(json.as_bytes()).unwrap();
        assert_eq!(envelope.segments.len(), 2);
        let batches = envelope.into_term_postings();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][0], TermPosting::new("anakin", 1, 1.0));
        assert_eq!(batches[0][1], TermPosting::new("anakin", 2, 3.5));
        assert_eq!(batches[1][0], TermPosting::new("vader", 3, 2.0));
    }

    #[test]
    fn malformed_json_is_malformed_encoding() {
        let err = SegmentPostings::from_json(b"not json").unwrap_err();
        assert!(matches!(err, crate::error::InvError::MalformedEncoding(_)));
    }

    #[test]
    fn missing_field_is_malformed_encoding() {
        let json = r#"{"segments": [[{"term": "x", "doc_id": 1}]]}"#;
        let err = SegmentPostings::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::error::InvError::MalformedEncoding(_)));
    }

    #[test]
    fn empty_segments_list_yields_no_batches() {
        let json = r#"{"segments": []}"#;
        let envelope = SegmentPostings::from_json(json.as_bytes()).unwrap();
        assert!(envelope.into_term_postings().is_empty());
    }
}
