//! Fundraising project.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::fields::{coerce_amount, initial_images, merge_field, merged_images, zero};
use super::require_title;
use crate::store::Record;

/// Fundraising state of a project.
///
/// Stored values other than `ongoing` and `completed` are kept verbatim as
/// `Other`; requests may only set the two known states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectStatus {
    #[default]
    Ongoing,
    Completed,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ongoing" => ProjectStatus::Ongoing,
            "completed" => ProjectStatus::Completed,
            _ => ProjectStatus::Other(raw),
        }
    }
}

impl Serialize for ProjectStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => raw.into(),
            Value::Null => ProjectStatus::default(),
            other => ProjectStatus::Other(other.to_string()),
        })
    }
}

fn check_status(status: Option<&ProjectStatus>) -> Result<(), String> {
    match status {
        Some(ProjectStatus::Other(_)) => Err("Status must be ongoing or completed".to_string()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default = "zero")]
    pub target_amount: Number,
    #[serde(default = "zero")]
    pub current_amount: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Single image from records written before image lists existed
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

/// Request body for creating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

/// Request body for a partial project update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Record for Project {
    type New = NewProject;
    type Patch = ProjectPatch;

    const COLLECTION: &'static str = "projects";
    const KIND: &'static str = "Project";
    const FETCH_BY_ID: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_new(new: &NewProject) -> Result<(), String> {
        require_title(new.title.as_deref().unwrap_or_default())?;
        check_status(new.status.as_ref())
    }

    fn validate_patch(patch: &ProjectPatch) -> Result<(), String> {
        patch.title.as_deref().map_or(Ok(()), require_title)?;
        check_status(patch.status.as_ref())
    }

    fn build(id: String, now: &str, new: NewProject) -> Self {
        Self {
            id,
            title: new.title.unwrap_or_default(),
            description: new.description.unwrap_or_default(),
            status: new.status.unwrap_or_default(),
            target_amount: new.target_amount.as_ref().map_or_else(zero, coerce_amount),
            current_amount: new.current_amount.as_ref().map_or_else(zero, coerce_amount),
            images: Some(initial_images(new.images.as_ref(), new.image.as_deref())),
            image: None,
            video: new.video.unwrap_or_default(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            extra: Map::new(),
        }
    }

    fn apply(&mut self, patch: ProjectPatch, now: &str) {
        merge_field(&mut self.title, patch.title);
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.status, patch.status);
        merge_field(
            &mut self.target_amount,
            patch.target_amount.as_ref().map(coerce_amount),
        );
        merge_field(
            &mut self.current_amount,
            patch.current_amount.as_ref().map(coerce_amount),
        );
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
    fn test_build_defaults() {
        let new: NewProject =
            serde_json::from_value(json!({ "title": "Roof repair", "targetAmount": 100000 }))
                .unwrap();
        let project = Project::build("p1".into(), "2024-01-01T00:00:00.000Z", new);

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["status"], "ongoing");
        assert_eq!(json["targetAmount"], 100000);
        assert_eq!(json["currentAmount"], 0);
        assert_eq!(json["images"], json!([]));
        assert_eq!(json["video"], "");
        assert_eq!(json["description"], "");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_status_patch() {
        let new: NewProject = serde_json::from_value(json!({ "title": "Well" })).unwrap();
        let mut project = Project::build("p1".into(), "t0", new);

        let patch: ProjectPatch = serde_json::from_value(json!({ "status": "completed" })).unwrap();
        project.apply(patch, "t1");

        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.title, "Well");
        assert_eq!(project.updated_at, "t1");
        assert_eq!(project.created_at, "t0");
    }

    #[test]
    fn test_unknown_status_is_rejected_in_requests() {
        let patch: ProjectPatch = serde_json::from_value(json!({ "status": "paused" })).unwrap();
        assert_eq!(
            Project::validate_patch(&patch),
            Err("Status must be ongoing or completed".to_string())
        );

        let new: NewProject =
            serde_json::from_value(json!({ "title": "Well", "status": "paused" })).unwrap();
        assert!(Project::validate_new(&new).is_err());
    }

    #[test]
    fn test_stored_unknown_status_round_trips() {
        let stored = json!({ "id": "b", "title": "Hall", "status": "planned", "featured": true });
        let project: Project = serde_json::from_value(stored).unwrap();

        assert_eq!(project.status, ProjectStatus::Other("planned".into()));
        assert_eq!(project.extra["featured"], json!(true));

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["status"], "planned");
        assert_eq!(json["featured"], true);
    }

    #[test]
    fn test_null_status_reads_as_ongoing() {
        let project: Project =
            serde_json::from_value(json!({ "id": "c", "status": null })).unwrap();
        assert_eq!(project.status, ProjectStatus::Ongoing);
    }

    #[test]
    fn test_title_validation() {
        assert!(Project::validate_new(&NewProject::default()).is_err());
        assert!(Project::validate_patch(&ProjectPatch::default()).is_ok());
        let blank = ProjectPatch {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(Project::validate_patch(&blank).is_err());
    }
}
