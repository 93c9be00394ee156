//! Announcement shown on the public site.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::merge_field;
use super::require_title;
use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Stored keys not modelled above, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Defaults to the creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Record for Announcement {
    type New = NewAnnouncement;
    type Patch = AnnouncementPatch;

    const COLLECTION: &'static str = "announcements";
    const KIND: &'static str = "Announcement";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_new(new: &NewAnnouncement) -> Result<(), String> {
        require_title(new.title.as_deref().unwrap_or_default())
    }

    fn validate_patch(patch: &AnnouncementPatch) -> Result<(), String> {
        patch.title.as_deref().map_or(Ok(()), require_title)
    }

    fn build(id: String, now: &str, new: NewAnnouncement) -> Self {
        Self {
            id,
            title: new.title.unwrap_or_default(),
            content: new.content.unwrap_or_default(),
            published_at: new
                .published_at
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| now.to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            extra: Map::new(),
        }
    }

    fn apply(&mut self, patch: AnnouncementPatch, now: &str) {
        merge_field(&mut self.title, patch.title);
        merge_field(&mut self.content, patch.content);
        merge_field(&mut self.published_at, patch.published_at);
        self.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_at_defaults_to_now() {
        let new = NewAnnouncement {
            title: Some("Ramadan timetable".into()),
            ..Default::default()
        };
        let announcement = Announcement::build("a1".into(), "2024-03-01T10:00:00.000Z", new);
        assert_eq!(announcement.published_at, "2024-03-01T10:00:00.000Z");
        assert_eq!(announcement.content, "");
    }

    #[test]
    fn test_explicit_published_at_kept() {
        let new = NewAnnouncement {
            title: Some("Eid".into()),
            published_at: Some("2024-04-09T00:00:00.000Z".into()),
            ..Default::default()
        };
        let announcement = Announcement::build("a1".into(), "t0", new);
        assert_eq!(announcement.published_at, "2024-04-09T00:00:00.000Z");
    }
}
