//! Filename derivation from URLs.
//!
//! The destination file name for a download is the final path segment of its
//! URL plus any query string, sanitized for Linux filesystems. Distinct links
//! can still reduce to the same name (same segment under different
//! directories), so [`assign_filenames`] resolves the names for a whole run,
//! tagging collisions, before any download starts.

use std::collections::HashSet;
use std::path::Path;

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe local filename for saving a download.
///
/// Uses the last path segment of `url` with the query string appended,
/// sanitized for Linux (no `/`, NUL, or control chars; no leading/trailing
/// dots or spaces). Falls back to `download.bin` when the path is empty or
/// reduces to nothing.
pub fn derive_filename(url: &str) -> String {
    let raw = match filename_from_url_path(url) {
        Some(c) => c,
        None => return DEFAULT_FILENAME.to_string(),
    };

    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Destination file names for a run's worth of unique links.
///
/// Each name starts as [`derive_filename`] of its link. Names must not
/// collide, and neither may their converted counterparts, which swap the
/// extension on the file stem. So stems are kept pairwise distinct: a link
/// whose stem is already taken gets `_N` appended to it (`clip.webm`,
/// `clip_1.webm`), with `N` bumped past any name the page supplied itself.
pub fn assign_filenames(links: &[String]) -> Vec<String> {
    let mut stems = HashSet::with_capacity(links.len());
    let mut names = Vec::with_capacity(links.len());
    for link in links {
        let candidate = derive_filename(link);
        let name = if stems.insert(stem_of(&candidate)) {
            candidate
        } else {
            let tagged = tag_colliding_name(&candidate, &stems);
            tracing::debug!(link = %link, name = %tagged, "file name already taken, tagged");
            stems.insert(stem_of(&tagged));
            tagged
        };
        names.push(name);
    }
    names
}

/// Extracts the last path segment, keeping any query string, for use as a
/// filename hint.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    match parsed.query() {
        Some(query) => Some(format!("{segment}?{query}")),
        None => Some(segment.to_string()),
    }
}

fn stem_of(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Smallest `_N` variant of `candidate` whose stem is still free.
fn tag_colliding_name(candidate: &str, stems: &HashSet<String>) -> String {
    let path = Path::new(candidate);
    let stem = stem_of(candidate);
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1u32;
    loop {
        let tagged_stem = format!("{stem}_{n}");
        if !stems.contains(&tagged_stem) {
            break match &ext {
                Some(ext) => format!("{tagged_stem}.{ext}"),
                None => tagged_stem,
            };
        }
        n += 1;
    }
}

/// Sanitizes a candidate filename for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, whitespace, and control characters with `_`
/// - Trims leading/trailing spaces, dots, and underscores
/// - Collapses consecutive underscores
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            '_'
        } else if c == ' ' || c == '\t' {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '\t' || c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
