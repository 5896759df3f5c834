use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of comics in one listing page.
pub const PAGE_SIZE: usize = 16;

const MAX_TAG_LEN: usize = 64;
const MAX_NAME_LEN: usize = 200;

/// A comic record stored in redb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicRecord {
    pub id: u64,
    pub tag: String,
    pub name: String,
    pub description: String,
    /// Set once at creation
    pub upload_date: NaiveDate,
    pub views: u64,
}

/// Columns that can be rewritten through an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Name,
    Description,
}

/// What an edit request targets: a plain field, or the owning tag (which
/// moves the comic and its photo folder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Field(EditableField),
    Tag,
}

impl FromStr for EditTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "comix_name" => Ok(EditTarget::Field(EditableField::Name)),
            "description" => Ok(EditTarget::Field(EditableField::Description)),
            "tag" | "comix_tag" => Ok(EditTarget::Tag),
            other => Err(format!(
                "param '{other}' is not editable (expected name, description or tag)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}': {reason}")]
pub struct InvalidName {
    pub kind: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Normalize a tag identifier: trimmed and lowercased. The result is used as
/// the database key, the photo folder name and the URL segment alike.
pub fn normalize_tag(raw: &str) -> Result<String, InvalidName> {
    let tag = raw.trim().to_lowercase();
    let invalid = |reason| InvalidName {
        kind: "tag",
        value: raw.to_string(),
        reason,
    };

    if tag.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(invalid("is too long"));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(invalid("may only contain letters, digits, '_' and '-'"));
    }
    Ok(tag)
}

/// Check that a comic name is usable as a single path segment.
pub fn validate_comic_name(name: &str) -> Result<(), InvalidName> {
    let invalid = |reason| InvalidName {
        kind: "comic name",
        value: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("is too long"));
    }
    if name.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(invalid("must not contain path separators"));
    }
    Ok(())
}

/// Offset of the first record on a 1-based page. Page 0 is treated as page 1;
/// the API rejects it before it gets here.
pub fn page_offset(page: u32) -> usize {
    (page.saturating_sub(1) as usize).saturating_mul(PAGE_SIZE)
}

/// Number of pages needed for `total` records. An empty listing still has one
/// (empty) page.
pub fn page_count(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(16), 1);
        assert_eq!(page_count(17), 2);
        assert_eq!(page_count(32), 2);
        assert_eq!(page_count(33), 3);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 16);
        assert_eq!(page_offset(0), 0);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Horror ").unwrap(), "horror");
        assert_eq!(normalize_tag("sci-fi_2").unwrap(), "sci-fi_2");
        assert!(normalize_tag("").is_err());
        assert!(normalize_tag("../etc").is_err());
        assert!(normalize_tag("two words").is_err());
        assert!(normalize_tag(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_comic_name() {
        assert!(validate_comic_name("Lost Signal").is_ok());
        assert!(validate_comic_name("Глава 1").is_ok());
        assert!(validate_comic_name("").is_err());
        assert!(validate_comic_name("   ").is_err());
        assert!(validate_comic_name("..").is_err());
        assert!(validate_comic_name(".staging").is_err());
        assert!(validate_comic_name("a/b").is_err());
        assert!(validate_comic_name("a\\b").is_err());
    }

    #[test]
    fn test_edit_target_from_str() {
        assert_eq!(
            "comix_name".parse::<EditTarget>(),
            Ok(EditTarget::Field(EditableField::Name))
        );
        assert_eq!(
            "description".parse::<EditTarget>(),
            Ok(EditTarget::Field(EditableField::Description))
        );
        assert_eq!("comix_tag".parse::<EditTarget>(), Ok(EditTarget::Tag));
        assert!("views".parse::<EditTarget>().is_err());
        assert!("upload_date".parse::<EditTarget>().is_err());
    }
}
