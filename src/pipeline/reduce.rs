//! Merging per-bucket partial counts into the final frequency table

use super::types::{FrequencyTable, PartialCount};

/// Fold partial counts, in the order supplied, into one table. A word new to
/// the accumulator is seeded from its partial; an existing word has the
/// counts summed and the provenance entries appended. Provenance order in
/// the result is the supply order. Callers guarantee exactly-once supply per
/// work item; this fold does not deduplicate.
pub fn merge_partials<I>(partials: I) -> FrequencyTable
where
    I: IntoIterator<Item = PartialCount>,
{
    let mut table = FrequencyTable::new();
    for partial in partials {
        for (word, incoming) in partial {
            match table.get_mut(&word) {
                Some(entry) => {
                    entry.count += incoming.count;
                    entry.provenance.extend(incoming.provenance);
                }
                None => {
                    table.insert(word, incoming);
                }
            }
        }
    }
    table
}
