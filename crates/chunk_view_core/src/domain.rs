//! crates/chunk_view_core/src/domain.rs
//!
//! Defines the core data structures fetched from the search service.
//! These structs are independent of the wire format; the HTTP adapter maps
//! its own records into them.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::metadata::Metadata;

/// Timestamp layouts accepted for a chunk's `time_stamp` front-matter field.
const TIME_STAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A unit of retrieved document content with its free-form metadata.
///
/// Chunks are immutable once fetched and replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: Uuid,
    pub chunk_html: String,
    pub link: Option<String>,
    pub tag_set: Option<String>,
    pub time_stamp: Option<String>,
    pub metadata: Option<Metadata>,
    pub author_id: Uuid,
}

impl Chunk {
    /// The tag set split on commas, trimmed, with empty tags dropped.
    pub fn tags(&self) -> Vec<&str> {
        self.tag_set
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `time_stamp` field parsed as an ISO-8601 date-time without timezone.
    ///
    /// Returns `None` when the field is absent or in any other layout; the raw
    /// string stays available on `time_stamp`.
    pub fn parsed_time_stamp(&self) -> Option<NaiveDateTime> {
        let raw = self.time_stamp.as_deref()?.trim();
        TIME_STAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// The link, ignoring blank values.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref().filter(|link| !link.trim().is_empty())
    }
}

/// A named grouping of chunks owned by exactly one author.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub author_id: Uuid,
}

/// One page of a user's collections as reported by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage {
    pub collections: Vec<Collection>,
    /// Raw server value; may be zero for an empty result set.
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            chunk_html: "<p>hello</p>".to_string(),
            link: None,
            tag_set: None,
            time_stamp: None,
            metadata: None,
            author_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn tags_are_split_and_trimmed() {
        let chunk = Chunk {
            tag_set: Some("law, ,finance,  court ".to_string()),
            ..chunk()
        };
        assert_eq!(chunk.tags(), vec!["law", "finance", "court"]);
    }

    #[test]
    fn missing_tag_set_yields_no_tags() {
        assert!(chunk().tags().is_empty());
    }

    #[test]
    fn time_stamp_parses_iso_layout() {
        let chunk = Chunk {
            time_stamp: Some("2021-03-04T05:06:07".to_string()),
            ..chunk()
        };
        let parsed = chunk.parsed_time_stamp().unwrap();
        assert_eq!(parsed.to_string(), "2021-03-04 05:06:07");
    }

    #[test]
    fn unparseable_time_stamp_is_none() {
        let chunk = Chunk {
            time_stamp: Some("last tuesday".to_string()),
            ..chunk()
        };
        assert!(chunk.parsed_time_stamp().is_none());
        assert_eq!(chunk.time_stamp.as_deref(), Some("last tuesday"));
    }

    #[test]
    fn blank_link_is_hidden() {
        let chunk = Chunk {
            link: Some("   ".to_string()),
            ..chunk()
        };
        assert!(chunk.link().is_none());
    }
}
