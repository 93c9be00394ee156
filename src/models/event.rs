//! Community event.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::{initial_images, merge_field, merged_images};
use super::require_title;
use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form date as entered by the admin
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub video: String,
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
pub struct NewEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Record for Event {
    type New = NewEvent;
    type Patch = EventPatch;

    const COLLECTION: &'static str = "events";
    const KIND: &'static str = "Event";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_new(new: &NewEvent) -> Result<(), String> {
        require_title(new.title.as_deref().unwrap_or_default())
    }

    fn validate_patch(patch: &EventPatch) -> Result<(), String> {
        patch.title.as_deref().map_or(Ok(()), require_title)
    }

    fn build(id: String, now: &str, new: NewEvent) -> Self {
        Self {
            id,
            title: new.title.unwrap_or_default(),
            description: new.description.unwrap_or_default(),
            date: new.date.unwrap_or_default(),
            time: new.time.unwrap_or_default(),
            location: new.location.unwrap_or_default(),
            images: Some(initial_images(new.images.as_ref(), new.image.as_deref())),
            image: None,
            video: new.video.unwrap_or_default(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            extra: Map::new(),
        }
    }

    fn apply(&mut self, patch: EventPatch, now: &str) {
        merge_field(&mut self.title, patch.title);
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.date, patch.date);
        merge_field(&mut self.time, patch.time);
        merge_field(&mut self.location, patch.location);
        self.images = Some(merged_images(
            self.images.take(),
            self.image.as_deref(),
            patch.images.as_ref(),
        ));
        merge_field(&mut self.video, patch.video);
        self.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_from_legacy_single_image() {
        let new: NewEvent = serde_json::from_value(json!({
            "title": "Eid picnic",
            "date": "2024-04-10",
            "image": "/uploads/picnic.jpg"
        }))
        .unwrap();
        let event = Event::build("e1".into(), "t0", new);

        assert_eq!(event.images, Some(vec!["/uploads/picnic.jpg".to_string()]));
        assert_eq!(event.time, "");
        assert_eq!(event.location, "");
    }

    #[test]
    fn test_patch_clears_video() {
        let new: NewEvent =
            serde_json::from_value(json!({ "title": "Talk", "video": "/uploads/talk.mp4" }))
                .unwrap();
        let mut event = Event::build("e1".into(), "t0", new);

        let patch: EventPatch = serde_json::from_value(json!({ "video": "" })).unwrap();
        event.apply(patch, "t1");

        assert_eq!(event.video, "");
        assert_eq!(event.title, "Talk");
    }
}
