use serde::{Deserialize, Deserializer, Serialize};

/// A file attached to an issue, as reported by the tracker.
///
/// `created` is kept in the tracker's native format
/// (e.g. `2020-12-01T10:00:00.000+0100`); rendering decides how much of it to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub author: User,
    #[serde(default)]
    pub created: String,
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    pub content: String,
}

/// Attachment author. Cloud installs identify users by `accountId`,
/// self-hosted installs by `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The slice of an issue this tool cares about: its key and attachment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(
        default,
        rename = "attachment",
        deserialize_with = "null_as_empty"
    )]
    pub attachments: Vec<Attachment>,
}

impl Issue {
    pub fn attachments(&self) -> &[Attachment] {
        &self.fields.attachments
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Attachment> {
        self.attachments().iter().find(|a| a.id == id)
    }

    /// First attachment with this filename. Filenames are not unique on an
    /// issue, so later duplicates are unreachable by name.
    pub fn find_by_filename(&self, filename: &str) -> Option<&Attachment> {
        self.attachments().iter().find(|a| a.filename == filename)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Attachment>, D::Error>
where
    D: Deserializer<'de>,
{
    let attachments = Option::<Vec<Attachment>>::deserialize(deserializer)?;
    Ok(attachments.unwrap_or_default())
}
