// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Path-level wrappers around `PdfReader`: read inputs from disk, write the
// result, report what was written.

use std::path::{Path, PathBuf};

use folio_core::{FolioError, Result};
use tracing::{info, instrument};

use super::reader::PdfReader;

/// Concatenate `inputs` into `output`, creating its parent directory if
/// needed. Returns the total page count.
#[instrument(skip_all, fields(inputs = inputs.len(), output = %output.as_ref().display()))]
pub fn merge_files(inputs: &[impl AsRef<Path>], output: impl AsRef<Path>) -> Result<usize> {
    let output = output.as_ref();
    let (first, rest) = inputs.split_first().ok_or_else(|| {
        FolioError::InvalidArgument("merge needs at least one input".to_string())
    })?;

    let base = PdfReader::open(first)?;
    let mut others = Vec::with_capacity(rest.len());
    for path in rest {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FolioError::NotFound(path.to_path_buf()));
        }
        others.push(std::fs::read(path)?);
    }
    let slices: Vec<&[u8]> = others.iter().map(Vec::as_slice).collect();
    let merged = base.merge(&slices)?;

    ensure_parent(output)?;
    std::fs::write(output, &merged)?;

    let total = PdfReader::from_bytes(&merged)?.page_count();
    info!(total, "Merged {} files into {}", inputs.len(), output.display());
    Ok(total)
}

/// Split `path` into files of `pages_per_chunk` pages inside `out_dir`.
///
/// Single-page chunks are named `<stem>_page_<n>.pdf`, longer ones
/// `<stem>_pages_<first>-<last>.pdf`. Returns the written paths in page order.
#[instrument(skip_all, fields(path = %path.as_ref().display(), pages_per_chunk = pages_per_chunk))]
pub fn split_file(
    path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    pages_per_chunk: u32,
) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let out_dir = out_dir.as_ref();
    let reader = PdfReader::open(path)?;
    let chunks = reader.split_into_chunks(pages_per_chunk)?;

    std::fs::create_dir_all(out_dir)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut written = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let name = if pages_per_chunk == 1 {
            format!("{stem}_page_{}.pdf", chunk.start)
        } else {
            format!("{stem}_pages_{}-{}.pdf", chunk.start, chunk.end)
        };
        let target = out_dir.join(name);
        std::fs::write(&target, &chunk.bytes)?;
        written.push(target);
    }

    info!(files = written.len(), "Split into {}", out_dir.display());
    Ok(written)
}

/// Write pages `start..=end` of `path` to `output`. Returns the output path.
#[instrument(skip_all, fields(path = %path.as_ref().display(), start = start, end = end))]
pub fn extract_range_file(
    path: impl AsRef<Path>,
    start: u32,
    end: u32,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let bytes = PdfReader::open(path)?.extract_page_range(start, end)?;
    ensure_parent(output)?;
    std::fs::write(output, bytes)?;
    info!("Wrote page range to {}", output.display());
    Ok(output.to_path_buf())
}

/// Rotate the selected pages (all when `pages` is `None`) and write the
/// result to `output`. Returns the output path.
#[instrument(skip_all, fields(path = %path.as_ref().display(), degrees = degrees))]
pub fn rotate_file(
    path: impl AsRef<Path>,
    output: impl AsRef<Path>,
    degrees: i32,
    pages: Option<&[u32]>,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let bytes = PdfReader::open(path)?.rotate_pages(degrees, pages)?;
    ensure_parent(output)?;
    std::fs::write(output, bytes)?;
    info!("Wrote rotated PDF to {}", output.display());
    Ok(output.to_path_buf())
}

/// Stamp the first page of `watermark` over every page of `path` and write
/// the result to `output`. Returns the output path.
#[instrument(skip_all, fields(path = %path.as_ref().display(), watermark = %watermark.as_ref().display()))]
pub fn watermark_file(
    path: impl AsRef<Path>,
    watermark: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let watermark = watermark.as_ref();
    let reader = PdfReader::open(path)?;
    if !watermark.exists() {
        return Err(FolioError::NotFound(watermark.to_path_buf()));
    }
    let bytes = reader.add_watermark(&std::fs::read(watermark)?)?;
    ensure_parent(output)?;
    std::fs::write(output, bytes)?;
    info!("Wrote watermarked PDF to {}", output.display());
    Ok(output.to_path_buf())
}

/// Password-protect `path` and write the result to `output`. The owner
/// password defaults to the user password. Returns the output path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn encrypt_file(
    path: impl AsRef<Path>,
    output: impl AsRef<Path>,
    user_password: &str,
    owner_password: Option<&str>,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let bytes = PdfReader::open(path)?.encrypt(user_password, owner_password)?;
    ensure_parent(output)?;
    std::fs::write(output, bytes)?;
    info!("Wrote encrypted PDF to {}", output.display());
    Ok(output.to_path_buf())
}

/// Remove password protection from `path` and write the result to
/// `output`. Returns the output path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decrypt_file(
    path: impl AsRef<Path>,
    output: impl AsRef<Path>,
    password: &str,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let bytes = PdfReader::open_with_password(path, password)?.to_bytes()?;
    ensure_parent(output)?;
    std::fs::write(output, bytes)?;
    info!("Wrote decrypted PDF to {}", output.display());
    Ok(output.to_path_buf())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::tests::fixture;

    fn write_fixture(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, fixture(pages)).unwrap();
        path
    }

    #[test]
    fn merge_creates_parent_and_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(dir.path(), "a.pdf", &["one", "two"]);
        let b = write_fixture(dir.path(), "b.pdf", &["three"]);
        let out = dir.path().join("nested/out/merged.pdf");

        let total = merge_files(&[&a, &b], &out).unwrap();
        assert_eq!(total, 3);
        assert_eq!(PdfReader::open(&out).unwrap().page_count(), 3);
    }

    #[test]
    fn merge_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(dir.path(), "a.pdf", &["one"]);
        let missing = dir.path().join("missing.pdf");

        let err = merge_files(&[&a, &missing], dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, FolioError::NotFound(p) if p == missing));

        let none: [&Path; 0] = [];
        assert!(matches!(
            merge_files(&none, dir.path().join("out.pdf")),
            Err(FolioError::InvalidArgument(_))
        ));
    }

    #[test]
    fn split_names_single_pages_and_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "report.pdf", &["1", "2", "3"]);

        let singles = split_file(&src, dir.path().join("singles"), 1).unwrap();
        let names: Vec<String> = singles
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["report_page_1.pdf", "report_page_2.pdf", "report_page_3.pdf"]);

        let pairs = split_file(&src, dir.path().join("pairs"), 2).unwrap();
        assert!(pairs[0].ends_with("report_pages_1-2.pdf"));
        assert!(pairs[1].ends_with("report_pages_3-3.pdf"));
        assert_eq!(PdfReader::open(&pairs[0]).unwrap().page_count(), 2);
    }

    #[test]
    fn extract_and_rotate_round_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "src.pdf", &["a", "b", "c"]);

        let part = extract_range_file(&src, 2, 3, dir.path().join("part.pdf")).unwrap();
        assert_eq!(PdfReader::open(&part).unwrap().page_count(), 2);

        let turned = rotate_file(&part, dir.path().join("turned.pdf"), 90, Some(&[2])).unwrap();
        let reader = PdfReader::open(&turned).unwrap();
        assert_eq!(reader.page_rotation(1).unwrap(), 0);
        assert_eq!(reader.page_rotation(2).unwrap(), 90);
    }

    #[test]
    fn encrypt_then_decrypt_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "src.pdf", &["private"]);

        let locked = encrypt_file(&src, dir.path().join("locked.pdf"), "test123", None).unwrap();
        assert!(PdfReader::open(&locked).unwrap().info().encrypted);

        let err = decrypt_file(&locked, dir.path().join("bad.pdf"), "nope").unwrap_err();
        assert!(matches!(err, FolioError::InvalidPassword));
        assert!(!dir.path().join("bad.pdf").exists());

        let unlocked = decrypt_file(&locked, dir.path().join("out/unlocked.pdf"), "test123").unwrap();
        let reader = PdfReader::open(&unlocked).unwrap();
        assert!(!reader.info().encrypted);
        assert!(reader.extract_page_text(1).unwrap().contains("private"));
    }

    #[test]
    fn watermark_keeps_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "src.pdf", &["a", "b", "c"]);
        let stamp = write_fixture(dir.path(), "stamp.pdf", &["DRAFT"]);

        let out = watermark_file(&src, &stamp, dir.path().join("stamped.pdf")).unwrap();
        assert_eq!(PdfReader::open(&out).unwrap().page_count(), 3);

        let err = watermark_file(&src, dir.path().join("none.pdf"), dir.path().join("x.pdf"))
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = rotate_file(dir.path().join("nope.pdf"), dir.path().join("x.pdf"), 90, None)
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }
}
