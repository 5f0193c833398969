//! Document representation: an ordered field mapping plus an integer identity.

use serde_json::Value;
use std::ops::Deref;

/// The integer identity of a document, unique within its table.
///
/// Ids are minted starting at 1. Once assigned, a document's id never
/// changes for the life of that record; it may be reused only after the
/// record is deleted.
pub type DocId = u64;

/// An ordered mapping of field names to values.
///
/// Insertion order is preserved (`serde_json` with `preserve_order`).
pub type Fields = serde_json::Map<String, Value>;

/// A single record stored in a table.
///
/// This is a transparent wrapper around a field mapping that also carries
/// the record's [`DocId`]. Identity is the id, not structural equality:
/// two documents with equal fields but different ids are different records.
///
/// `Document` derefs to its [`Fields`], so field lookups read naturally:
///
/// ```
/// use shelfdb_core::document::Document;
/// use serde_json::json;
///
/// let doc = Document::new(1, json!({"name": "kafka"}).as_object().unwrap().clone());
/// assert_eq!(doc.get("name"), Some(&json!("kafka")));
/// assert_eq!(doc.doc_id(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    doc_id: DocId,
    fields: Fields,
}

impl Document {
    /// Creates a document from an already-assigned id and its fields.
    pub fn new(doc_id: DocId, fields: Fields) -> Self {
        Self { doc_id, fields }
    }

    /// Returns this document's identity.
    pub fn doc_id(&self) -> DocId {
        self.doc_id
    }

    /// Legacy name for [`Document::doc_id`].
    #[deprecated(note = "eid has been renamed to doc_id")]
    pub fn eid(&self) -> DocId {
        self.doc_id
    }

    /// Returns the document's field mapping.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Consumes the document, returning its field mapping.
    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl Deref for Document {
    type Target = Fields;

    fn deref(&self) -> &Fields {
        &self.fields
    }
}
