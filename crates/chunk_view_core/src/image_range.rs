//! crates/chunk_view_core/src/image_range.rs
//!
//! Derives a contiguous page-image range from two metadata fields and builds
//! the image and PDF links that reference it.

use tracing::debug;

use crate::metadata::{self, Metadata};

/// A contiguous span of page-image identifiers sharing one string prefix.
///
/// `start <= end` is not guaranteed; the values come straight from
/// user-supplied metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRange {
    pub start: u64,
    pub end: u64,
    pub prefix: String,
}

impl ImageRange {
    /// Number of images in the range, `0` when the range is inverted.
    pub fn image_count(&self) -> u64 {
        span(self.start, self.end).unwrap_or(0)
    }

    /// Identifiers of every image in the range, `prefix + (start + offset)`.
    ///
    /// Lazy: the bounds come from untrusted metadata, so callers take only
    /// as many as they show.
    pub fn image_ids(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.image_count())
            .map(move |offset| format!("{}{}", self.prefix, self.start + offset))
    }

    /// Links to every page image, `{base}/image/{prefix}{index}.png`.
    pub fn image_urls<'a>(&'a self, base_url: &'a str) -> impl Iterator<Item = String> + 'a {
        let base = base_url.trim_end_matches('/');
        self.image_ids()
            .map(move |id| format!("{}/image/{}.png", base, urlencoding::encode(&id)))
    }

    /// Link to the PDF assembled from the range.
    pub fn pdf_url(&self, base_url: &str, display_name: &str, with_ocr: bool) -> String {
        format!(
            "{}/pdf_from_range/{}/{}/{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.start,
            self.end,
            urlencoding::encode(&self.prefix),
            urlencoding::encode(display_name),
            with_ocr
        )
    }
}

/// Resolves image ranges using the two configured metadata key names.
///
/// Either key may be unset, in which case no chunk has an image range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRangeResolver {
    start_key: Option<String>,
    end_key: Option<String>,
}

impl ImageRangeResolver {
    pub fn new(start_key: Option<String>, end_key: Option<String>) -> Self {
        Self { start_key, end_key }
    }

    /// Derives the range for a chunk's metadata.
    ///
    /// Yields `None` when a key is unconfigured, when the mapping lacks either
    /// field, or when either field holds no digits. The prefix assumes the
    /// numeric token is a trailing run of digits; other shapes are out of
    /// contract and produce whatever the trailing cut leaves behind.
    pub fn resolve(&self, metadata: Option<&Metadata>) -> Option<ImageRange> {
        let start_key = self.start_key.as_deref()?;
        let end_key = self.end_key.as_deref()?;

        let raw_start = metadata::field_as_string(metadata, start_key)?;
        let raw_end = metadata::field_as_string(metadata, end_key)?;

        let start = parse_digits(&raw_start)?;
        let end = parse_digits(&raw_end)?;
        if end >= start && span(start, end).is_none() {
            debug!(start, end, "Image range too large to count");
            return None;
        }

        Some(ImageRange {
            start,
            end,
            prefix: strip_trailing(&raw_start, start.to_string().len()),
        })
    }
}

/// `end - start + 1`, `None` when inverted or when the count overflows `u64`.
fn span(start: u64, end: u64) -> Option<u64> {
    end.checked_sub(start).and_then(|d| d.checked_add(1))
}

/// Drops every non-digit character and parses what is left in base 10.
///
/// An empty remainder, or one too large for `u64`, is not a number.
fn parse_digits(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Removes the last `count` characters of `raw`.
fn strip_trailing(raw: &str, count: usize) -> String {
    let keep = raw.chars().count().saturating_sub(count);
    raw.chars().take(keep).collect()
}
