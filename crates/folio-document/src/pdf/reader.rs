// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open, inspect, search, merge, split, rotate, watermark and
// password-protect existing PDF documents using the `lopdf` crate.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use folio_core::{FolioError, Result};
use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions,
    Stream, StringFormat,
};
use regex::RegexBuilder;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Document metadata and basic statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdfInfo {
    pub num_pages: usize,
    /// Size of the source in KiB, rounded to one decimal place.
    pub file_size_kb: f64,
    pub encrypted: bool,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
    /// Raw `/CreationDate` value, e.g. `D:20260501120000Z`.
    pub creation_date: String,
}

/// One regex hit. Page and line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub page: u32,
    pub line_number: usize,
    /// The whole line, trimmed.
    pub line: String,
    #[serde(rename = "match")]
    pub matched: String,
}

/// A consecutive run of pages cut from a larger document.
#[derive(Debug, Clone)]
pub struct PageChunk {
    pub start: u32,
    pub end: u32,
    pub bytes: Vec<u8>,
}

/// Reads and manipulates existing PDF files.
///
/// Wraps `lopdf::Document`. Every operation that produces a new document
/// returns its serialised bytes and leaves the reader untouched.
pub struct PdfReader {
    document: Document,
    /// Size of the source in bytes.
    source_len: u64,
}

/// Resource name under which the watermark form is registered on each page.
const WATERMARK_XOBJECT: &str = "FolioWatermark";

/// Key length, in bits, of the RC4 encryption applied by [`PdfReader::encrypt`].
const ENCRYPTION_KEY_BITS: usize = 128;

/// Same-length stand-in for the trailer's `/Encrypt` key; see
/// [`PdfReader::from_bytes_with_password`].
const PARKED_ENCRYPT_KEY: &[u8] = b"/Parked_";

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(FolioError::NotFound(path_ref.to_path_buf()));
        }
        info!("Opening PDF: {}", path_ref.display());

        let source_len = std::fs::metadata(path_ref)?.len();
        let document = Document::load(path_ref).map_err(|err| {
            FolioError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_len,
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| FolioError::Pdf(format!("failed to load PDF from memory: {}", err)))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_len: data.len() as u64,
        })
    }

    /// Open a PDF from the filesystem, unlocking it with `password`.
    pub fn open_with_password(path: impl AsRef<Path>, password: &str) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(FolioError::NotFound(path_ref.to_path_buf()));
        }
        Self::from_bytes_with_password(&std::fs::read(path_ref)?, password)
    }

    /// Load PDF bytes, decrypting them with `password` (user or owner).
    ///
    /// The reader holds the decrypted document. Unencrypted input is loaded
    /// as is and the password is ignored. A password that opens neither the
    /// user nor the owner side is [`FolioError::InvalidPassword`].
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes_with_password(data: &[u8], password: &str) -> Result<Self> {
        let locked = Document::load_mem(data)
            .map_err(|err| FolioError::Pdf(format!("failed to load PDF from memory: {}", err)))?;
        if !locked.is_encrypted() {
            debug!("PDF is not encrypted, password ignored");
            return Ok(Self {
                document: locked,
                source_len: data.len() as u64,
            });
        }

        locked
            .authenticate_password(password)
            .map_err(|_| FolioError::InvalidPassword)?;

        // lopdf only decodes an encrypted file's objects while loading when
        // the user password is empty. With the trailer key renamed it loads
        // every object as stored, and the real password decrypts them.
        let mut document = Document::load_mem(&park_encrypt_entry(data)?)
            .map_err(|err| FolioError::Pdf(format!("failed to reload encrypted PDF: {}", err)))?;
        let encrypt = document
            .trailer
            .remove(&PARKED_ENCRYPT_KEY[1..])
            .ok_or_else(|| FolioError::Pdf("encryption dictionary went missing".to_string()))?;
        document.trailer.set("Encrypt", encrypt);
        document
            .decrypt(password)
            .map_err(|err| FolioError::Pdf(format!("failed to decrypt: {}", err)))?;

        info!(pages = document.get_pages().len(), "PDF decrypted");
        Ok(Self {
            document,
            source_len: data.len() as u64,
        })
    }

    /// Serialise the document as it currently stands.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialise(&mut self.document.clone(), "PDF")
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Metadata from the trailer `/Info` dictionary plus page count and size.
    /// Missing entries are empty strings.
    pub fn info(&self) -> PdfInfo {
        let mut info = PdfInfo {
            num_pages: self.page_count(),
            file_size_kb: (self.source_len as f64 / 1024.0 * 10.0).round() / 10.0,
            encrypted: self.document.is_encrypted(),
            ..PdfInfo::default()
        };

        if let Some(dict) = self.info_dictionary() {
            info.title = dictionary_string(dict, b"Title");
            info.author = dictionary_string(dict, b"Author");
            info.subject = dictionary_string(dict, b"Subject");
            info.creator = dictionary_string(dict, b"Creator");
            info.producer = dictionary_string(dict, b"Producer");
            info.creation_date = dictionary_string(dict, b"CreationDate");
        }
        info
    }

    /// `/Rotate` of a page (1-indexed), 0 when unset.
    pub fn page_rotation(&self, page_number: u32) -> Result<i32> {
        let page_id = self.page_id(page_number)?;
        Ok(self
            .document
            .get_dictionary(page_id)
            .ok()
            .and_then(|dict| dict.get(b"Rotate").ok())
            .and_then(|r| r.as_i64().ok())
            .map_or(0, |v| v as i32))
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.document.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(FolioError::PageOutOfRange {
                page: page_number,
                total: pages.len() as u32,
            })
    }

    // -- Text -----------------------------------------------------------------

    /// Text of one page (1-indexed). Pages without a text layer give an empty
    /// string.
    pub fn extract_page_text(&self, page_number: u32) -> Result<String> {
        self.page_id(page_number)?;
        Ok(self.page_text(page_number))
    }

    /// Every page that carries text, as `--- Page N ---` followed by its text,
    /// separated by blank lines.
    #[instrument(skip(self))]
    pub fn extract_text(&self) -> String {
        let blocks: Vec<String> = (1..=self.page_count() as u32)
            .filter_map(|n| {
                let text = self.page_text(n);
                (!text.trim().is_empty()).then(|| format!("--- Page {n} ---\n{text}"))
            })
            .collect();

        debug!(pages_with_text = blocks.len(), "Text extracted");
        blocks.join("\n\n")
    }

    /// Text of pages `start..=end` keyed by page number. `end` is clamped to
    /// the last page.
    pub fn extract_text_range(&self, start: u32, end: u32) -> Result<BTreeMap<u32, String>> {
        let end = self.clamped_range(start, end)?;
        Ok((start..=end).map(|n| (n, self.page_text(n))).collect())
    }

    fn page_text(&self, page_number: u32) -> String {
        match self.document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(err) => {
                warn!(page_number, %err, "No extractable text");
                String::new()
            }
        }
    }

    /// Find every match of `pattern` in the extracted text, line by line.
    #[instrument(skip(self))]
    pub fn search(&self, pattern: &str, case_sensitive: bool) -> Result<Vec<SearchMatch>> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|err| FolioError::InvalidPattern(err.to_string()))?;

        let mut matches = Vec::new();
        for page in 1..=self.page_count() as u32 {
            let text = self.page_text(page);
            for (index, line) in text.lines().enumerate() {
                for found in regex.find_iter(line) {
                    matches.push(SearchMatch {
                        page,
                        line_number: index + 1,
                        line: line.trim().to_string(),
                        matched: found.as_str().to_string(),
                    });
                }
            }
        }

        info!(hits = matches.len(), "Search complete");
        Ok(matches)
    }

    // -- Extraction -----------------------------------------------------------

    /// Copy pages `start..=end` (1-indexed, `end` clamped) into a new PDF.
    #[instrument(skip(self))]
    pub fn extract_page_range(&self, start: u32, end: u32) -> Result<Vec<u8>> {
        let end = self.clamped_range(start, end)?;
        self.keep_pages(start, end)
    }

    /// Cut the document into consecutive chunks of `pages_per_chunk` pages;
    /// the last chunk may be shorter.
    #[instrument(skip(self))]
    pub fn split_into_chunks(&self, pages_per_chunk: u32) -> Result<Vec<PageChunk>> {
        if pages_per_chunk == 0 {
            return Err(FolioError::InvalidArgument(
                "pages per chunk must be at least 1".to_string(),
            ));
        }

        let total = self.page_count() as u32;
        info!(total, pages_per_chunk, "Splitting PDF");

        let mut chunks = Vec::new();
        let mut start = 1;
        while start <= total {
            let end = (start + pages_per_chunk - 1).min(total);
            chunks.push(PageChunk {
                start,
                end,
                bytes: self.keep_pages(start, end)?,
            });
            start = end + 1;
        }
        Ok(chunks)
    }

    /// Validate `start` and return `end` clamped to the page count.
    fn clamped_range(&self, start: u32, end: u32) -> Result<u32> {
        let total = self.page_count() as u32;
        if start == 0 || start > total {
            return Err(FolioError::PageOutOfRange { page: start, total });
        }
        let end = end.min(total);
        if end < start {
            return Err(FolioError::InvalidArgument(format!(
                "page range {start}-{end} is empty"
            )));
        }
        Ok(end)
    }

    /// Serialise a copy holding only pages `start..=end`.
    fn keep_pages(&self, start: u32, end: u32) -> Result<Vec<u8>> {
        let mut doc = self.document.clone();
        let drop: Vec<u32> = doc
            .get_pages()
            .keys()
            .copied()
            .filter(|n| *n < start || *n > end)
            .collect();
        doc.delete_pages(&drop);
        doc.prune_objects();

        debug!(start, end, dropped = drop.len(), "Page range kept");
        serialise(&mut doc, "page range")
    }

    // -- Combination ----------------------------------------------------------

    /// Merge this document with one or more other PDF byte-slices, producing a
    /// combined PDF. Pages appear in the order: self, then each supplied
    /// document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[&[u8]]) -> Result<Vec<u8>> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut merged = self.document.clone();

        for (index, other_bytes) in others.iter().enumerate() {
            let other_doc = Document::load_mem(other_bytes).map_err(|err| {
                FolioError::Pdf(format!(
                    "failed to load additional PDF #{}: {}",
                    index + 1,
                    err
                ))
            })?;

            // One id map per source so shared fonts are copied once.
            let mut copier = ObjectCopier::new(&other_doc);
            for page_id in other_doc.get_pages().into_values() {
                copier.append_page(&mut merged, page_id)?;
            }
        }

        let output = serialise(&mut merged, "merged PDF")?;
        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }

    /// Add `degrees` (a multiple of 90) to the rotation of the given pages, or
    /// of every page when `pages` is `None`. Page numbers past the end are
    /// ignored.
    #[instrument(skip(self))]
    pub fn rotate_pages(&self, degrees: i32, pages: Option<&[u32]>) -> Result<Vec<u8>> {
        if degrees % 90 != 0 {
            return Err(FolioError::InvalidRotation(degrees));
        }

        let mut doc = self.document.clone();
        let page_map = doc.get_pages();

        if let Some(selected) = pages {
            for n in selected.iter().filter(|n| !page_map.contains_key(*n)) {
                warn!(page = n, total = page_map.len(), "Skipping rotation of missing page");
            }
        }

        let mut rotated = 0;
        for (number, page_id) in &page_map {
            if pages.is_some_and(|selected| !selected.contains(number)) {
                continue;
            }

            let existing = doc
                .get_dictionary(*page_id)
                .ok()
                .and_then(|dict| dict.get(b"Rotate").ok())
                .and_then(|r| r.as_i64().ok())
                .unwrap_or(0);
            let new_rotation = (existing + i64::from(degrees)).rem_euclid(360);

            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
                dict.set("Rotate", Object::Integer(new_rotation));
                rotated += 1;
            }
        }

        info!(rotated, degrees, "Pages rotated");
        serialise(&mut doc, "rotated PDF")
    }

    /// Stamp the first page of the `watermark` PDF over every page.
    ///
    /// The stamp is added once as a form XObject and drawn after each page's
    /// own content, so it sits on top.
    #[instrument(skip_all, fields(watermark_bytes = watermark.len()))]
    pub fn add_watermark(&self, watermark: &[u8]) -> Result<Vec<u8>> {
        let stamp = Document::load_mem(watermark)
            .map_err(|err| FolioError::Pdf(format!("failed to load watermark PDF: {}", err)))?;
        let stamp_page = stamp.get_pages().into_values().next().ok_or_else(|| {
            FolioError::InvalidArgument("watermark PDF has no pages".to_string())
        })?;

        let mut doc = self.document.clone();
        let form_id = ObjectCopier::new(&stamp).append_form(&mut doc, stamp_page)?;

        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let stamp_ops = format!("\nQ q /{WATERMARK_XOBJECT} Do Q\n");
        let close_id = doc.add_object(Stream::new(Dictionary::new(), stamp_ops.into_bytes()));

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for page_id in &page_ids {
            pin_resources(&mut doc, *page_id);
            doc.add_xobject(*page_id, WATERMARK_XOBJECT, form_id)
                .map_err(|err| FolioError::Pdf(format!("cannot register watermark: {}", err)))?;
            wrap_page_contents(&mut doc, *page_id, open_id, close_id)?;
        }

        info!(pages = page_ids.len(), "Watermark applied");
        serialise(&mut doc, "watermarked PDF")
    }

    /// Password-protect the document with 128-bit RC4.
    ///
    /// `owner_password` defaults to `user_password`. Already-encrypted input
    /// is rejected.
    #[instrument(skip_all)]
    pub fn encrypt(&self, user_password: &str, owner_password: Option<&str>) -> Result<Vec<u8>> {
        if self.document.is_encrypted() {
            return Err(FolioError::InvalidArgument(
                "document is already encrypted".to_string(),
            ));
        }

        let mut doc = self.document.clone();
        ensure_file_id(&mut doc);

        let state = EncryptionState::try_from(EncryptionVersion::V2 {
            document: &doc,
            owner_password: owner_password.unwrap_or(user_password),
            user_password,
            key_length: ENCRYPTION_KEY_BITS,
            permissions: Permissions::all(),
        })
        .map_err(|err| FolioError::Pdf(format!("cannot prepare encryption: {}", err)))?;
        doc.encrypt(&state)
            .map_err(|err| FolioError::Pdf(format!("failed to encrypt: {}", err)))?;

        info!(pages = self.page_count(), "PDF encrypted");
        serialise(&mut doc, "encrypted PDF")
    }
}

fn serialise(doc: &mut Document, what: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| FolioError::Pdf(format!("failed to serialise {what}: {err}")))?;
    Ok(output)
}

/// Copy of `data` with the last `/Encrypt` name key renamed to
/// [`PARKED_ENCRYPT_KEY`]. Byte offsets are unchanged, so the xref table
/// stays valid.
fn park_encrypt_entry(data: &[u8]) -> Result<Vec<u8>> {
    const KEY: &[u8] = b"/Encrypt";
    let at = data
        .windows(KEY.len() + 1)
        .rposition(|w| w.starts_with(KEY) && ends_name(w[KEY.len()]))
        .ok_or_else(|| FolioError::Pdf("encrypted PDF has no /Encrypt entry".to_string()))?;

    let mut parked = data.to_vec();
    parked[at..at + KEY.len()].copy_from_slice(PARKED_ENCRYPT_KEY);
    Ok(parked)
}

/// Whether `byte` terminates a PDF name token.
fn ends_name(byte: u8) -> bool {
    byte.is_ascii_whitespace() || b"()<>[]{}/%".contains(&byte)
}

/// Encryption keys are derived from the trailer `/ID`; give the document one
/// if it has none.
fn ensure_file_id(doc: &mut Document) {
    if doc.trailer.has(b"ID") {
        return;
    }
    let stamp = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .to_be_bytes();
    let id: Vec<u8> = stamp.iter().chain(&(doc.max_id as u64).to_be_bytes()).copied().collect();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}

/// Give a page its own `/Resources` entry, taking the inherited one if any,
/// so additions do not land in an empty dictionary that hides the parent's.
fn pin_resources(doc: &mut Document, page_id: ObjectId) {
    let has_own = doc
        .get_dictionary(page_id)
        .is_ok_and(|page| page.has(b"Resources"));
    if has_own {
        return;
    }
    let resources = inherited(doc, page_id, b"Resources")
        .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));
    if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
        page.set("Resources", resources);
    }
}

/// Surround a page's content streams with the shared `open` and `close`
/// streams.
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    open: ObjectId,
    close: ObjectId,
) -> Result<()> {
    let existing: Vec<Object> = match doc
        .get_dictionary(page_id)
        .and_then(|page| page.get(b"Contents"))
    {
        Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open));
    contents.extend(existing);
    contents.push(Object::Reference(close));

    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            page.set("Contents", Object::Array(contents));
            Ok(())
        }
        _ => Err(FolioError::Pdf(format!("page object {:?} is not a dictionary", page_id))),
    }
}

/// Walk up the `/Parent` chain of `page_id` looking for `key`.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound guards against cyclic parents.
    for _ in 0..32 {
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
    }
    None
}

/// Read a text entry, decoding UTF-16BE (BOM `FE FF`) and falling back to
/// Latin-1 for bytes that are not UTF-8. Missing or non-text entries are empty.
fn dictionary_string(dict: &Dictionary, key: &[u8]) -> String {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => decode_text_string(bytes),
        Ok(Object::Name(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
        _ => String::new(),
    }
}

fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// -- Cross-document page copying -------------------------------------------------

/// Page attributes a page may take from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copies pages and everything they reference from one document into another.
///
/// Each source object is copied at most once; references that point back at
/// an object already being copied (annotation `/P` entries, for instance)
/// resolve to its new id instead of recursing.
struct ObjectCopier<'s> {
    source: &'s Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'s> ObjectCopier<'s> {
    fn new(source: &'s Document) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    /// Copy the page `page_id` into `target`, appending it as the last page.
    fn append_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<()> {
        let pages_id = target
            .catalog()
            .map_err(|err| FolioError::Pdf(format!("no catalog: {}", err)))?
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|err| FolioError::Pdf(format!("no /Pages reference: {}", err)))?;

        // Inherited attributes would be lost once the page moves under a new
        // parent, so they are pulled onto the page itself.
        let mut page = self
            .source
            .get_dictionary(page_id)
            .map_err(|err| {
                FolioError::Pdf(format!("cannot read page object {:?}: {}", page_id, err))
            })?
            .clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited(self.source, page_id, key)
            {
                page.set(key.to_vec(), value);
            }
        }

        let cloned_id = self.copy_reference(target, page_id, Object::Dictionary(page));

        if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(pages_id) {
            if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
                kids.push(Object::Reference(cloned_id));
            }
            if let Ok(Object::Integer(count)) = pages_dict.get_mut(b"Count") {
                *count += 1;
            }
        }

        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(cloned_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }

        Ok(())
    }

    /// Copy the page `page_id` into `target` as a form XObject with the
    /// page's resources and media box. Returns the form's id.
    fn append_form(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let content = source
            .get_page_content(page_id)
            .map_err(|err| FolioError::Pdf(format!("cannot read watermark content: {}", err)))?;
        let page = source.get_dictionary(page_id).map_err(|err| {
            FolioError::Pdf(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let attribute = |key: &[u8]| {
            page.get(key)
                .ok()
                .cloned()
                .or_else(|| inherited(source, page_id, key))
        };
        let resources =
            attribute(b"Resources").unwrap_or_else(|| Object::Dictionary(Dictionary::new()));
        let bbox = attribute(b"MediaBox").unwrap_or_else(|| {
            Object::Array([0, 0, 612, 792].into_iter().map(Object::Integer).collect())
        });

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Form".to_vec()));
        dict.set("BBox", self.deep_copy(target, &bbox));
        dict.set("Resources", self.deep_copy(target, &resources));

        Ok(target.add_object(Stream::new(dict, content)))
    }

    /// Reserve an id for `source_id`, then fill it with a deep copy of `object`.
    fn copy_reference(&mut self, target: &mut Document, source_id: ObjectId, object: Object) -> ObjectId {
        let new_id = target.new_object_id();
        self.copied.insert(source_id, new_id);
        let cloned = self.deep_copy(target, &object);
        target.objects.insert(new_id, cloned);
        new_id
    }

    fn deep_copy(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.deep_copy(target, item)).collect())
            }
            Object::Reference(ref_id) => {
                if let Some(existing) = self.copied.get(ref_id) {
                    return Object::Reference(*existing);
                }
                match self.source.get_object(*ref_id) {
                    Ok(referenced) => {
                        let referenced = referenced.clone();
                        Object::Reference(self.copy_reference(target, *ref_id, referenced))
                    }
                    Err(err) => {
                        warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                        Object::Null
                    }
                }
            }
            Object::Stream(stream) => Object::Stream(lopdf::Stream::new(
                self.copy_dictionary(target, &stream.dict),
                stream.content.clone(),
            )),
            other => other.clone(),
        }
    }

    /// Copy a dictionary, skipping `/Parent`; the caller re-links pages.
    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.deep_copy(target, value));
        }
        copy
    }
}
