//! Build-time index state: the document table and the term → posting-list
//! map, populated one document at a time and serialised by [`crate::persist`].

use std::collections::HashMap;

use crate::tokenizer;

pub type DocId = u32;

/// Expected vocabulary size; the posting map is pre-sized for it and grows
/// freely past it.
const POSTING_MAP_CAPACITY: usize = 100_000;

/// One indexed record. Created on ingest and never mutated afterwards,
/// except `token_count`, which grows as the document's text is indexed.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: DocId,
    pub url: Vec<u8>,
    pub title: Vec<u8>,
    /// Byte length of the original content.
    pub content_length: u32,
    /// Accepted term occurrences across content and title, duplicates
    /// included.
    pub token_count: u32,
    /// Reserved; the builder always writes zero.
    pub unique_terms: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    pub use_stemming: bool,
}

/// In-memory index under construction. Owns every term string and posting
/// list until [`crate::persist::save`] writes them out.
pub struct Indexer {
    documents: Vec<Document>,
    postings: HashMap<Vec<u8>, Vec<DocId>>,
    options: IndexOptions,
    created_at: u64,
}

impl Indexer {
    pub fn new(options: IndexOptions) -> Self {
        Self {
            documents: Vec::new(),
            postings: HashMap::with_capacity(POSTING_MAP_CAPACITY),
            options,
            created_at: time::OffsetDateTime::now_utc().unix_timestamp() as u64,
        }
    }

    pub fn is_stemming(&self) -> bool {
        self.options.use_stemming
    }

    /// Build timestamp, seconds since the Unix epoch, captured at
    /// construction.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Documents in ingest order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn unique_terms(&self) -> usize {
        self.postings.len()
    }

    /// Posting list for a normalised term, if the term was ever indexed.
    pub fn posting_list(&self, term: &[u8]) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Records a document and indexes its content, then its title, into the
    /// posting map. `doc_id` is caller-assigned and must be positive; IDs
    /// must arrive in ascending order for the posting lists to stay sorted
    /// through ingest.
    pub fn add_document(&mut self, doc_id: DocId, url: &[u8], title: &[u8], content: &[u8]) {
        self.documents.push(Document {
            doc_id,
            url: url.to_vec(),
            title: title.to_vec(),
            content_length: content.len() as u32,
            token_count: 0,
            unique_terms: 0,
        });
        self.index_text(doc_id, content);
        self.index_text(doc_id, title);
    }

    fn index_text(&mut self, doc_id: DocId, text: &[u8]) {
        let stemming = self.options.use_stemming;
        for term in tokenizer::analyze(text, stemming) {
            let list = self.postings.entry(term).or_default();
            // The same term repeats freely inside one document; the scan
            // keeps each document in a list at most once.
            if !list.contains(&doc_id) {
                list.push(doc_id);
            }
            if let Some(doc) = self.documents.last_mut() {
                doc.token_count += 1;
            }
        }
    }

    /// Sorts every posting list ascending. Ingest already keeps them
    /// non-decreasing; this pass makes the invariant unconditional before
    /// serialisation.
    pub fn sort_postings(&mut self) {
        for list in self.postings.values_mut() {
            list.sort_unstable();
        }
    }

    /// Term entries ordered by byte-wise term comparison, the order the
    /// inverted file is written in and the searcher binary-searches over.
    pub fn sorted_terms(&self) -> Vec<(&[u8], &[DocId])> {
        let mut entries: Vec<(&[u8], &[DocId])> = self
            .postings
            .iter()
            .map(|(term, list)| (term.as_slice(), list.as_slice()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_terms_index_once_but_count_every_occurrence() {
        let mut indexer = Indexer::new(IndexOptions::default());
        indexer.add_document(1, b"http://a", b"kitap", b"kitap kitap kitap");
        assert_eq!(indexer.posting_list(b"kitap"), Some(&[1u32][..]));
        // Three content occurrences plus the title.
        assert_eq!(indexer.documents()[0].token_count, 4);
    }

    #[test]
    fn title_terms_share_the_content_posting_list() {
        let mut indexer = Indexer::new(IndexOptions::default());
        indexer.add_document(1, b"http://a", b"tarih", b"osmanli");
        indexer.add_document(2, b"http://b", b"", b"tarih");
        assert_eq!(indexer.posting_list(b"tarih"), Some(&[1u32, 2][..]));
    }

    #[test]
    fn sorted_terms_are_byte_ordered() {
        let mut indexer = Indexer::new(IndexOptions::default());
        indexer.add_document(1, b"http://a", b"", b"zeytin elma armut");
        indexer.sort_postings();
        let terms: Vec<&[u8]> = indexer.sorted_terms().iter().map(|(t, _)| *t).collect();
        assert_eq!(terms, [&b"armut"[..], b"elma", b"zeytin"]);
    }
}
