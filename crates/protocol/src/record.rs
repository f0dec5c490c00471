use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a record's media attachment is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// A media attachment. The kind is optional, but a kind can never exist
/// without a URL: `Record` holds `Option<Media>`, not two parallel fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub url: String,
    pub kind: Option<MediaKind>,
}

/// One feed item. Immutable once constructed; only the fetch boundary
/// (the feed-gateway client) creates these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: Option<DateTime<Utc>>,
    pub author: Option<String>,
    /// Ordered category tags, possibly empty.
    #[serde(default)]
    pub categories: Vec<String>,
    pub media: Option<Media>,
    /// Source-native fields preserved verbatim.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            published: None,
            author: None,
            categories: Vec::new(),
            media: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn media(mut self, url: impl Into<String>, kind: Option<MediaKind>) -> Self {
        self.media = Some(Media {
            url: url.into(),
            kind,
        });
        self
    }

    #[must_use]
    pub fn extra_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}
