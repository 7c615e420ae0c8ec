//! Record and collection identity.

use serde::{Deserialize, Serialize};

/// A cached document.
///
/// Records are opaque, schema-less JSON objects as delivered by the remote
/// source. The cache never interprets their contents beyond extracting the
/// identity key for its collection.
pub type Record = serde_json::Value;

/// The three record collections the cache maintains.
///
/// Each collection is independent: identity keys are unique within a
/// collection and are never compared across collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Query rewriter telemetry documents.
    Rewriter,
    /// Conversation/adoption documents.
    Adoption,
    /// User feedback documents.
    Feedback,
}

impl CollectionKind {
    /// All collections, in sync order.
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Rewriter,
        CollectionKind::Adoption,
        CollectionKind::Feedback,
    ];

    /// The collection's wire and snapshot name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::Rewriter => "rewriter",
            CollectionKind::Adoption => "adoption",
            CollectionKind::Feedback => "feedback",
        }
    }

    /// Extracts the identity key of a record in this collection.
    ///
    /// For `rewriter` and `feedback` this is the document's `id` field.
    /// For `adoption` it is `id` if present, otherwise `conversation_id`
    /// (older adoption documents predate the `id` field).
    ///
    /// Returns `None` for a record that carries neither field; such a
    /// record has no identity and cannot be merged.
    #[must_use]
    pub fn identity_of(&self, record: &Record) -> Option<String> {
        match self {
            CollectionKind::Rewriter | CollectionKind::Feedback => field_str(record, "id"),
            CollectionKind::Adoption => {
                field_str(record, "id").or_else(|| field_str(record, "conversation_id"))
            }
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn field_str(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(|v| v.as_str()).map(String::from)
}
