//! Data model shared across the pipeline stages
//!
//! Value types only; all of them serialize through serde so step inputs and
//! outputs can live in the workflow history log. Count tables use `BTreeMap`
//! so serialized output is byte-identical across runs.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One named document and where to fetch it from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Unique document name, the provenance key
    pub name: String,
    /// Source location the fetch transport resolves
    pub uri: String,
}

/// Immutable input to a workflow run: documents in caller-specified order.
///
/// Serialized as a JSON object (`{"<name>": "<uri>", ...}`) to match the
/// request body shape; the custom serde impls preserve the object's entry
/// order, which the gather step uses as its fixed iteration order. A
/// repeated name replaces the earlier entry in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentSet(Vec<DocumentSource>);

impl DocumentSet {
    pub fn new(documents: Vec<DocumentSource>) -> Self {
        Self(documents)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentSource> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: String, uri: String) {
        match self.0.iter_mut().find(|doc| doc.name == name) {
            Some(existing) => existing.uri = uri,
            None => self.0.push(DocumentSource { name, uri }),
        }
    }
}

impl FromIterator<(String, String)> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut set = DocumentSet::default();
        for (name, uri) in iter {
            set.insert(name, uri);
        }
        set
    }
}

impl Serialize for DocumentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for doc in &self.0 {
            map.serialize_entry(&doc.name, &doc.uri)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DocumentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentSetVisitor;

        impl<'de> Visitor<'de> for DocumentSetVisitor {
            type Value = DocumentSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of document name to source URI")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = DocumentSet::default();
                while let Some((name, uri)) = access.next_entry::<String, String>()? {
                    set.insert(name, uri);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(DocumentSetVisitor)
    }
}

/// A contiguous slice of a document's word sequence, the unit of parallel
/// work. `bucket_id` is the zero-based chunk index within the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBucket {
    pub bucket_id: u64,
    pub document_name: String,
    pub text: String,
}

/// The unit fanned out to the map step; one per [`TextBucket`].
pub type WorkItem = TextBucket;

/// Which document bucket contributed how many occurrences of a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub document_name: String,
    pub bucket_id: u64,
    pub count: u64,
}

/// A word's tally plus the buckets it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub count: u64,
    pub provenance: Vec<Provenance>,
}

/// Counts for a single bucket: each entry carries exactly one provenance
/// record pointing back at the originating bucket.
pub type PartialCount = BTreeMap<String, WordEntry>;

/// Final workflow output. For every word, `count` equals the sum of the
/// `count` fields across its provenance list, and no two provenance entries
/// share a `(document_name, bucket_id)` pair.
pub type FrequencyTable = BTreeMap<String, WordEntry>;
