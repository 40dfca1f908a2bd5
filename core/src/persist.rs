//! The on-disk index format and its loader.
//!
//! An index is three companion files sharing a base path:
//!
//! - `<base>.meta`: a fixed 296-byte header record;
//! - `<base>.forward`: the document table in ingest order;
//! - `<base>.inverted`: term entries in ascending byte-wise term order,
//!   each with its posting list.
//!
//! All integers are little-endian. The byte layout is the contract between
//! builder and searcher and must be reproducible octet for octet.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{IndexError, Result};
use crate::index::{DocId, Document, Indexer};

pub const INDEX_MAGIC: u32 = 0x4944_4558;
pub const INDEX_VERSION: u16 = 0x0001;

pub const FLAG_COMPRESSED: u16 = 0x0001;
pub const FLAG_STEMMED: u16 = 0x0002;
pub const FLAG_POSITIONAL: u16 = 0x0004;

/// Zero bytes at the tail of the metadata record.
const META_RESERVED_LEN: usize = 256;

/// Header record mirrored in `<base>.meta`. The four offset/size fields are
/// reserved for a future single-file container: the builder writes zeros
/// and the loader ignores them.
#[derive(Debug, Clone)]
pub struct IndexMetadata {
    pub version: u16,
    pub flags: u16,
    pub total_documents: u32,
    pub total_unique_terms: u32,
    /// Build time, seconds since the Unix epoch.
    pub timestamp: u64,
    pub forward_offset: u32,
    pub forward_size: u32,
    pub inverted_offset: u32,
    pub inverted_size: u32,
}

/// One term with its posting list, as loaded from the inverted file.
#[derive(Debug, Clone)]
pub struct TermEntry {
    pub term: Vec<u8>,
    pub doc_ids: Vec<DocId>,
}

impl TermEntry {
    pub fn document_frequency(&self) -> u32 {
        self.doc_ids.len() as u32
    }
}

/// `<base>.<ext>`, appended rather than substituted so a base path with
/// dots keeps its name.
pub fn companion_path(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Writes the three index files for a built, sorted index. Re-running over
/// an existing base truncates and rewrites the files.
pub fn save(index: &Indexer, base: &Path) -> Result<()> {
    let metadata = IndexMetadata {
        version: INDEX_VERSION,
        flags: if index.is_stemming() { FLAG_STEMMED } else { 0 },
        total_documents: index.documents().len() as u32,
        total_unique_terms: index.unique_terms() as u32,
        timestamp: index.created_at(),
        forward_offset: 0,
        forward_size: 0,
        inverted_offset: 0,
        inverted_size: 0,
    };
    write_meta(&metadata, &companion_path(base, "meta"))?;
    write_forward(index.documents(), &companion_path(base, "forward"))?;
    write_inverted(&index.sorted_terms(), &companion_path(base, "inverted"))?;
    Ok(())
}

fn write_meta(metadata: &IndexMetadata, path: &Path) -> Result<()> {
    let mut w = IndexFileWriter::create(path)?;
    w.write_u32(INDEX_MAGIC)?;
    w.write_u16(metadata.version)?;
    w.write_u16(metadata.flags)?;
    w.write_u32(metadata.total_documents)?;
    w.write_u32(metadata.total_unique_terms)?;
    w.write_u64(metadata.timestamp)?;
    w.write_u32(metadata.forward_offset)?;
    w.write_u32(metadata.forward_size)?;
    w.write_u32(metadata.inverted_offset)?;
    w.write_u32(metadata.inverted_size)?;
    w.write_bytes(&[0u8; META_RESERVED_LEN])?;
    w.finish()
}

fn write_forward(documents: &[Document], path: &Path) -> Result<()> {
    let mut w = IndexFileWriter::create(path)?;
    let num_docs = documents.len() as u32;
    w.write_u32(num_docs)?;
    // Reserved slot, written as a second copy of the count.
    w.write_u32(num_docs)?;
    for doc in documents {
        w.write_u32(doc.doc_id)?;
        w.write_len_prefixed(&doc.url)?;
        w.write_len_prefixed(&doc.title)?;
        w.write_u32(doc.content_length)?;
        w.write_u32(doc.token_count)?;
        w.write_u32(doc.unique_terms)?;
    }
    w.finish()
}

fn write_inverted(entries: &[(&[u8], &[DocId])], path: &Path) -> Result<()> {
    let mut w = IndexFileWriter::create(path)?;
    let num_terms = entries.len() as u32;
    w.write_u32(num_terms)?;
    w.write_u32(num_terms)?;
    for (term, doc_ids) in entries {
        w.write_len_prefixed(term)?;
        w.write_u32(doc_ids.len() as u32)?;
        for &doc_id in *doc_ids {
            w.write_u32(doc_id)?;
        }
    }
    w.finish()
}

/// A loaded index: the document table in written order and the term table
/// in ascending byte-wise order, everything resident.
#[derive(Debug)]
pub struct IndexReader {
    metadata: IndexMetadata,
    documents: Vec<Document>,
    terms: Vec<TermEntry>,
    debug: bool,
}

impl IndexReader {
    /// Reads and validates the three companion files. On any failure the
    /// partially loaded state is dropped and the error names the file.
    pub fn load(base: &Path) -> Result<Self> {
        let metadata = read_meta(&companion_path(base, "meta"))?;
        let documents = read_forward(&companion_path(base, "forward"))?;
        let terms = read_inverted(&companion_path(base, "inverted"))?;
        let debug = std::env::var_os("DEBUG_SEARCH").is_some_and(|v| !v.is_empty());
        Ok(Self {
            metadata,
            documents,
            terms,
            debug,
        })
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn terms(&self) -> &[TermEntry] {
        &self.terms
    }

    pub fn total_documents(&self) -> u32 {
        self.metadata.total_documents
    }

    pub fn total_terms(&self) -> u32 {
        self.metadata.total_unique_terms
    }

    /// Binary search over the sorted term table, byte-wise comparison. With
    /// the `DEBUG_SEARCH` environment variable set at load time, every
    /// probe is traced to stderr.
    pub fn find_term(&self, term: &[u8]) -> Option<&TermEntry> {
        if self.debug {
            eprintln!(
                "DEBUG: searching for '{}' among {} terms",
                String::from_utf8_lossy(term),
                self.terms.len()
            );
            if let (Some(first), Some(last)) = (self.terms.first(), self.terms.last()) {
                eprintln!(
                    "DEBUG: first term '{}', last term '{}'",
                    String::from_utf8_lossy(&first.term),
                    String::from_utf8_lossy(&last.term)
                );
            }
        }

        let mut left = 0usize;
        let mut right = self.terms.len();
        while left < right {
            let mid = left + (right - left) / 2;
            let entry = &self.terms[mid];
            let ord = term.cmp(entry.term.as_slice());
            if self.debug {
                eprintln!(
                    "DEBUG: left={left} right={right} mid={mid} term='{}' ord={ord:?}",
                    String::from_utf8_lossy(&entry.term)
                );
            }
            match ord {
                std::cmp::Ordering::Equal => return Some(entry),
                std::cmp::Ordering::Less => right = mid,
                std::cmp::Ordering::Greater => left = mid + 1,
            }
        }
        None
    }

    /// Linear scan of the document table. Only the display path calls this,
    /// so the scan is fine.
    pub fn get_document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.doc_id == doc_id)
    }
}

fn read_meta(path: &Path) -> Result<IndexMetadata> {
    let mut r = IndexFileReader::open(path)?;
    let magic = r.read_u32("magic")?;
    if magic != INDEX_MAGIC {
        return Err(IndexError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("bad magic 0x{magic:08X}, expected 0x{INDEX_MAGIC:08X}"),
        });
    }
    let version = r.read_u16("version")?;
    let flags = r.read_u16("flags")?;
    let total_documents = r.read_u32("total_documents")?;
    let total_unique_terms = r.read_u32("total_unique_terms")?;
    let timestamp = r.read_u64("timestamp")?;
    let forward_offset = r.read_u32("forward_offset")?;
    let forward_size = r.read_u32("forward_size")?;
    let inverted_offset = r.read_u32("inverted_offset")?;
    let inverted_size = r.read_u32("inverted_size")?;
    r.read_bytes(META_RESERVED_LEN, "reserved")?;
    Ok(IndexMetadata {
        version,
        flags,
        total_documents,
        total_unique_terms,
        timestamp,
        forward_offset,
        forward_size,
        inverted_offset,
        inverted_size,
    })
}

fn read_forward(path: &Path) -> Result<Vec<Document>> {
    let mut r = IndexFileReader::open(path)?;
    let num_docs = r.read_u32("num_docs")?;
    let _reserved = r.read_u32("reserved")?;
    let mut documents = Vec::with_capacity(num_docs as usize);
    for _ in 0..num_docs {
        let doc_id = r.read_u32("doc_id")?;
        let url_len = r.read_u16("url_length")?;
        let url = r.read_bytes(url_len as usize, "url")?;
        let title_len = r.read_u16("title_length")?;
        let title = r.read_bytes(title_len as usize, "title")?;
        let content_length = r.read_u32("content_length")?;
        let token_count = r.read_u32("token_count")?;
        let unique_terms = r.read_u32("unique_terms")?;
        documents.push(Document {
            doc_id,
            url,
            title,
            content_length,
            token_count,
            unique_terms,
        });
    }
    Ok(documents)
}

fn read_inverted(path: &Path) -> Result<Vec<TermEntry>> {
    let mut r = IndexFileReader::open(path)?;
    let num_terms = r.read_u32("num_terms")?;
    let _reserved = r.read_u32("reserved")?;
    let mut terms = Vec::with_capacity(num_terms as usize);
    for _ in 0..num_terms {
        let term_len = r.read_u16("term_length")?;
        let term = r.read_bytes(term_len as usize, "term")?;
        let df = r.read_u32("document_frequency")?;
        let mut doc_ids = Vec::with_capacity(df as usize);
        for _ in 0..df {
            doc_ids.push(r.read_u32("doc_ids")?);
        }
        terms.push(TermEntry { term, doc_ids });
    }
    Ok(terms)
}

/// Buffered writer that stamps the file path onto every I/O error.
struct IndexFileWriter {
    path: PathBuf,
    inner: BufWriter<File>,
}

impl IndexFileWriter {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: BufWriter::new(file),
        })
    }

    fn io_err(&self, source: std::io::Error) -> IndexError {
        IndexError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner
            .write_u16::<LittleEndian>(value)
            .map_err(|e| self.io_err(e))
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner
            .write_u32::<LittleEndian>(value)
            .map_err(|e| self.io_err(e))
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner
            .write_u64::<LittleEndian>(value)
            .map_err(|e| self.io_err(e))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|e| self.io_err(e))
    }

    /// `u16` length then the bytes; anything past 65535 bytes is cut so the
    /// prefix and payload always agree.
    fn write_len_prefixed(&mut self, bytes: &[u8]) -> Result<()> {
        let len = bytes.len().min(u16::MAX as usize);
        self.write_u16(len as u16)?;
        self.write_bytes(&bytes[..len])
    }

    fn finish(mut self) -> Result<()> {
        self.inner.flush().map_err(|e| self.io_err(e))
    }
}

/// Buffered reader that turns short reads into [`IndexError::Truncated`]
/// and stamps the file path onto everything else.
struct IndexFileReader {
    path: PathBuf,
    inner: BufReader<File>,
}

impl IndexFileReader {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: BufReader::new(file),
        })
    }

    fn read_err(&self, source: std::io::Error, what: &'static str) -> IndexError {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            IndexError::Truncated {
                path: self.path.clone(),
                what,
            }
        } else {
            IndexError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }

    fn read_u16(&mut self, what: &'static str) -> Result<u16> {
        self.inner
            .read_u16::<LittleEndian>()
            .map_err(|e| self.read_err(e, what))
    }

    fn read_u32(&mut self, what: &'static str) -> Result<u32> {
        self.inner
            .read_u32::<LittleEndian>()
            .map_err(|e| self.read_err(e, what))
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64> {
        self.inner
            .read_u64::<LittleEndian>()
            .map_err(|e| self.read_err(e, what))
    }

    fn read_bytes(&mut self, len: usize, what: &'static str) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.read_err(e, what))?;
        Ok(buf)
    }
}
