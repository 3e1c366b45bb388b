//! Splitting document text into fixed-size word buckets

use super::types::TextBucket;

/// Split `text` on whitespace and group the words into consecutive chunks of
/// up to `bucket_size` words. The final chunk may be shorter; empty text
/// yields no buckets. Output is byte-identical for identical input.
pub fn bucketize(text: &str, document_name: &str, bucket_size: usize) -> Vec<TextBucket> {
    assert!(bucket_size > 0, "bucket_size must be positive");

    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(bucket_size)
        .enumerate()
        .map(|(index, chunk)| TextBucket {
            bucket_id: index as u64,
            document_name: document_name.to_string(),
            text: chunk.join(" "),
        })
        .collect()
}
