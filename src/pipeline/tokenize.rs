//! Tokenizing and counting a single bucket
//!
//! Pure with respect to input: no I/O, no shared state, safe to run many
//! instances concurrently and to re-run on retry.

use super::types::{PartialCount, Provenance, WordEntry, WorkItem};
use std::collections::HashSet;

/// Count the words of one bucket. Candidate words are maximal runs of ASCII
/// letters in the lowercased text; runs shorter than `min_word_len` and
/// stopwords are discarded. Every surviving word gets a single provenance
/// entry naming the originating bucket and the local count.
pub fn count_bucket(
    item: &WorkItem,
    stopwords: &HashSet<&str>,
    min_word_len: usize,
) -> PartialCount {
    let lowered = item.text.to_lowercase();
    let mut partial = PartialCount::new();

    for token in lowered.split(|c: char| !c.is_ascii_alphabetic()) {
        if token.len() < min_word_len || stopwords.contains(token) {
            continue;
        }
        let entry = partial.entry(token.to_string()).or_insert_with(|| WordEntry {
            count: 0,
            provenance: vec![Provenance {
                document_name: item.document_name.clone(),
                bucket_id: item.bucket_id,
                count: 0,
            }],
        });
        entry.count += 1;
        entry.provenance[0].count += 1;
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_stopwords;
    use crate::pipeline::types::TextBucket;

    fn item(text: &str) -> WorkItem {
        TextBucket {
            bucket_id: 2,
            document_name: "doc".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn counts_lowercased_letter_runs() {
        let partial = count_bucket(&item("Fox fox FOX jumps"), default_stopwords(), 3);
        assert_eq!(partial["fox"].count, 3);
        assert_eq!(partial["jumps"].count, 1);
    }

    #[test]
    fn stopwords_never_appear() {
        let partial = count_bucket(&item("the quick brown fox over the lazy dog"), default_stopwords(), 3);
        assert!(!partial.contains_key("the"));
        assert!(!partial.contains_key("over"));
        assert!(partial.contains_key("quick"));
    }

    #[test]
    fn short_runs_are_discarded() {
        let partial = count_bucket(&item("go ox cat"), default_stopwords(), 3);
        assert!(!partial.contains_key("go"));
        assert!(!partial.contains_key("ox"));
        assert_eq!(partial["cat"].count, 1);
    }

    #[test]
    fn non_letters_split_candidate_runs() {
        // digits and punctuation terminate a run; "abc123def" holds two words
        let partial = count_bucket(&item("abc123def mid-word don't"), default_stopwords(), 3);
        assert_eq!(partial["abc"].count, 1);
        assert_eq!(partial["def"].count, 1);
        assert_eq!(partial["mid"].count, 1);
        assert_eq!(partial["word"].count, 1);
        // "don't" splits into "don" and "t"; "t" is too short
        assert_eq!(partial["don"].count, 1);
        assert!(!partial.contains_key("t"));
    }

    #[test]
    fn provenance_is_a_single_local_entry() {
        let partial = count_bucket(&item("fox fox jumps"), default_stopwords(), 3);
        let fox = &partial["fox"];
        assert_eq!(fox.provenance.len(), 1);
        assert_eq!(
            fox.provenance[0],
            Provenance {
                document_name: "doc".to_string(),
                bucket_id: 2,
                count: 2,
            }
        );
        assert_eq!(fox.count, fox.provenance[0].count);
    }

    #[test]
    fn counting_is_idempotent() {
        let work = item("Fox fox jumps over the dog");
        let first = count_bucket(&work, default_stopwords(), 3);
        let second = count_bucket(&work, default_stopwords(), 3);
        assert_eq!(first, second);
    }
}
