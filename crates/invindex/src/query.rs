//! Multi-segment, multi-term TF-IDF query engine.
//!
//! A [`QueryEngine`] owns no data of its own beyond borrowed segment
//! references and a corpus-wide document count. Queries are conjunctive:
//! a document only scores if every queried term has at least one posting
//! for it in at least one segment.

use crate::error::{InvError, Result};
use crate::segment::Segment;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One scored hit returned by [`QueryEngine::multi_term_query`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    /// The matching document id.
    pub doc_id: u32,
    /// Its TF-IDF score, summed across segments and terms.
    pub score: f32,
}

/// A heap entry tracking one (segment, term) iterator's current position.
struct HeapEntry<'a> {
    doc_id: u32,
    term_idx: usize,
    iter: crate::iterator::PostingIterator<'a>,
}

impl<'a> PartialEq for HeapEntry<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.doc_id == other.doc_id
    }
}
impl<'a> Eq for HeapEntry<'a> {}
impl<'a> PartialOrd for HeapEntry<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<'a> Ord for HeapEntry<'a> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest doc id surfaces first.
        other.doc_id.cmp(&self.doc_id)
    }
}

/// Queries a fixed set of segments under a shared corpus document count.
pub struct QueryEngine<'a> {
    segments: Vec<&'a Segment>,
    total_docs: u32,
}

impl<'a> QueryEngine<'a> {
    /// Build an engine over `segments`, validating that `total_docs`
    /// matches the cardinality of the union of every segment's doc ids.
    /// Fails with [`InvError::InvalidArgument`] on mismatch or an empty
    /// segment list.
    pub fn new(segments: Vec<&'a Segment>, total_docs: u32) -> Result<Self> {
        if segments.is_empty() {
            return Err(InvError::InvalidArgument(
                "query engine requires at least one segment".to_string(),
            ));
        }

        let mut union = crate::roaring::RoaringBitmap::new();
        for segment in &segments {
            for doc_id in segment.doc_ids().iter() {
                union.add(doc_id);
            }
        }
        if union.cardinality() as u32 != total_docs {
            return Err(InvError::InvalidArgument(format!(
                "total_docs {total_docs} disagrees with observed corpus cardinality {}",
                union.cardinality()
            )));
        }

        Ok(QueryEngine {
            segments,
            total_docs,
        })
    }

    /// Corpus-wide document count this engine was constructed with.
    pub fn total_docs(&self) -> u32 {
        self.total_docs
    }

    /// Document frequency of `term`: the sum, across all segments, of
    /// that segment's `total_docs` for the term (per §4.8c; this sums
    /// rather than dedups, so a doc id carrying the same term in more
    /// than one segment counts once per segment).
    fn document_frequency(&self, term: &str) -> u32 {
        self.segments
            .iter()
            .filter_map(|s| s.term_metadata(term))
            .map(|m| m.total_docs())
            .sum()
    }

    /// Run a conjunctive multi-term query: a document must contain every
    /// term in `terms` to be scored. Scores are TF-IDF, `idf = ln((N+1)/(df+1))`,
    /// with per-term frequencies summed across segments. Results are
    /// sorted with `cmp`, typically a descending-score comparator.
    pub fn multi_term_query<F>(&self, terms: &[String], mut cmp: F) -> Result<Vec<ScoredDoc>>
    where
        F: FnMut(&ScoredDoc, &ScoredDoc) -> Ordering,
    {
        if terms.is_empty() {
            return Err(InvError::InvalidArgument(
                "multi_term_query requires at least one term".to_string(),
            ));
        }

        let n = self.total_docs as f32;
        let idfs: Vec<f32> = terms
            .iter()
            .map(|term| {
                let df = self.document_frequency(term) as f32;
                ((n + 1.0) / (df + 1.0)).ln()
            })
            .collect();

        let mut heap: BinaryHeap<HeapEntry<'a>> = BinaryHeap::new();
        for (term_idx, term) in terms.iter().enumerate() {
            let mut found_non_empty = false;
            for segment in &self.segments {
                let mut iter = segment.term_iterator(term);
                if iter.next()? {
                    found_non_empty = true;
                    let doc_id = iter.doc_id()?;
                    heap.push(HeapEntry {
                        doc_id,
                        term_idx,
                        iter,
                    });
                }
            }
            if !found_non_empty {
                return Err(InvError::TermNotFound(term.clone()));
            }
        }

        let mut results = Vec::new();
        while let Some(top) = heap.peek() {
            let current_doc = top.doc_id;

            let mut tf_per_term = vec![0.0f32; terms.len()];
            let mut terms_present = vec![false; terms.len()];
            let mut drained = Vec::new();

            while let Some(entry) = heap.peek() {
                if entry.doc_id != current_doc {
                    break;
                }
                let mut entry = heap.pop().expect("just peeked");
                terms_present[entry.term_idx] = true;
                tf_per_term[entry.term_idx] += entry.iter.term_frequency()?;

                if entry.iter.next()? {
                    let next_doc = entry.iter.doc_id()?;
                    drained.push(HeapEntry {
                        doc_id: next_doc,
                        term_idx: entry.term_idx,
                        iter: entry.iter,
                    });
                }
            }
            for entry in drained {
                heap.push(entry);
            }

            if terms_present.iter().all(|&p| p) {
                let score: f32 = tf_per_term
                    .iter()
                    .zip(idfs.iter())
                    .map(|(tf, idf)| tf * idf)
                    .sum();
                results.push(ScoredDoc {
                    doc_id: current_doc,
                    score,
                });
            }
        }

        results.sort_by(|a, b| cmp(a, b));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::TermPosting;

    fn descending_score(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    }

    #[test]
    fn single_term_query_ranks_by_tf() {
        let mut seg = Segment::new();
        seg.bulk_index([
            TermPosting::new("force", 1, 1.0),
            TermPosting::new("force", 2, 5.0),
        ])
        .unwrap();

        let engine = QueryEngine::new(vec![&seg], 2).unwrap();
        let hits = engine
            .multi_term_query(&["force".to_string()], descending_score)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc_id, 2);
        assert_eq!(hits[1].doc_id, 1);
    }

    #[test]
    fn conjunctive_query_requires_all_terms() {
        let mut seg = Segment::new();
        seg.bulk_index([
            TermPosting::new("jedi", 1, 1.0),
            TermPosting::new("jedi", 2, 1.0),
            TermPosting::new("sith", 2, 1.0),
        ])
        .unwrap();

        let engine = QueryEngine::new(vec![&seg], 2).unwrap();
        let hits = engine
            .multi_term_query(&["jedi".to_string(), "sith".to_string()], descending_score)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 2);
    }

    #[test]
    fn cross_segment_hit_combines_term_frequencies() {
        let mut seg_a = Segment::new();
        seg_a.bulk_index([TermPosting::new("rebel", 1, 1.0)]).unwrap();
        let mut seg_b = Segment::new();
        seg_b.bulk_index([TermPosting::new("rebel", 1, 2.0)]).unwrap();

        let engine = QueryEngine::new(vec![&seg_a, &seg_b], 1).unwrap();
        let hits = engine
            .multi_term_query(&["rebel".to_string()], descending_score)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 1);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn cross_segment_miss_yields_no_results() {
        let mut seg_a = Segment::new();
        seg_a.bulk_index([TermPosting::new("rebel", 1, 1.0)]).unwrap();
        let mut seg_b = Segment::new();
        seg_b.bulk_index([TermPosting::new("empire", 2, 1.0)]).unwrap();

        let engine = QueryEngine::new(vec![&seg_a, &seg_b], 2).unwrap();
        let hits = engine
            .multi_term_query(
                &["rebel".to_string(), "empire".to_string()],
                descending_score,
            )
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn mismatched_total_docs_is_invalid_argument() {
        let mut seg = Segment::new();
        seg.bulk_index([TermPosting::new("x", 1, 1.0)]).unwrap();
        let err = QueryEngine::new(vec![&seg], 99).unwrap_err();
        assert!(matches!(err, InvError::InvalidArgument(_)));
    }

    #[test]
    fn empty_segment_list_is_invalid_argument() {
        let err = QueryEngine::new(vec![], 0).unwrap_err();
        assert!(matches!(err, InvError::InvalidArgument(_)));
    }

    #[test]
    fn absent_term_is_term_not_found() {
        let mut seg = Segment::new();
        seg.bulk_index([TermPosting::new("jedi", 1, 1.0)]).unwrap();

        let engine = QueryEngine::new(vec![&seg], 1).unwrap();
        let err = engine
            .multi_term_query(&["sith".to_string()], descending_score)
            .unwrap_err();
        assert!(matches!(err, InvError::TermNotFound(t) if t == "sith"));
    }
}
