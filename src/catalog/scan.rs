use super::CatalogError;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

/// One run of a file name split at digit boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk<'a> {
    Text(String),
    Digits(&'a str),
}

/// Splits `name` into alternating text and digit runs, always starting with
/// a (possibly empty) text run so chunks line up position by position.
fn chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut rest = name;
    loop {
        let text_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        out.push(Chunk::Text(rest[..text_end].to_lowercase()));
        rest = &rest[text_end..];
        if rest.is_empty() {
            break;
        }
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        out.push(Chunk::Digits(&rest[..digits_end]));
        rest = &rest[digits_end..];
        if rest.is_empty() {
            break;
        }
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ordering: `clip2` sorts before `clip10`, letters ignore case.
/// Names that compare equal that way are ordered by their raw text.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            // runs always alternate text/digits from the same start
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Less,
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn is_mp4(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// Every `.mp4` file (any case) directly inside `folder`, in natural order.
pub fn scan_clips(folder: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !folder.is_dir() {
        return Err(CatalogError::NotAFolder(folder.to_path_buf()));
    }

    let mut clips = Vec::new();
    for entry in folder.read_dir().map_err(|source| CatalogError::ReadFolder {
        folder: folder.to_path_buf(),
        source,
    })? {
        let path = entry
            .map_err(|source| CatalogError::ReadFolder {
                folder: folder.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && is_mp4(&path) {
            clips.push(path);
        }
    }

    if clips.is_empty() {
        return Err(CatalogError::NoClips(folder.to_path_buf()));
    }

    clips.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    log::info!("found {} clips in \"{}\"", clips.len(), folder.display());
    Ok(clips)
}
