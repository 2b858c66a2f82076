//! Bitbucket Server comment and task payloads.

use serde::{Deserialize, Serialize};

/// Body of a comment or task POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

/// Where a comment or task is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Anchor {
    /// A line in the pull request diff
    Line(LineAnchor),
    /// Another comment (used by tasks)
    Comment(CommentAnchor),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAnchor {
    pub line: u32,
    pub line_type: LineType,
    pub file_type: FileType,
    /// Repository-relative path
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    Added,
    Removed,
    Context,
}

/// Diff side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentAnchor {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: AnchorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorKind {
    Comment,
}

/// The part of Bitbucket's comment response we use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedComment {
    #[serde(default)]
    pub id: Option<u64>,
}

impl CommentRequest {
    /// Top-level pull request comment.
    pub fn general(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: None,
        }
    }

    /// Comment on an added line in the target side of the diff.
    pub fn on_added_line(text: impl Into<String>, path: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            anchor: Some(Anchor::Line(LineAnchor {
                line,
                line_type: LineType::Added,
                file_type: FileType::To,
                path: path.into(),
            })),
        }
    }

    /// Task attached to an existing comment.
    pub fn task_on_comment(text: impl Into<String>, comment_id: u64) -> Self {
        Self {
            text: text.into(),
            anchor: Some(Anchor::Comment(CommentAnchor {
                id: comment_id,
                kind: AnchorKind::Comment,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_general_comment_has_no_anchor() {
        let body = serde_json::to_value(CommentRequest::general("hello")).unwrap();
        assert_eq!(body, json!({"text": "hello"}));
    }

    #[test]
    fn test_line_anchor_shape() {
        let body =
            serde_json::to_value(CommentRequest::on_added_line("msg", "src/app.js", 12)).unwrap();
        assert_eq!(
            body,
            json!({
                "text": "msg",
                "anchor": {
                    "line": 12,
                    "lineType": "ADDED",
                    "fileType": "TO",
                    "path": "src/app.js"
                }
            })
        );
    }

    #[test]
    fn test_task_anchor_shape() {
        let body = serde_json::to_value(CommentRequest::task_on_comment("fix 2 lint errors", 99))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "text": "fix 2 lint errors",
                "anchor": {"id": 99, "type": "COMMENT"}
            })
        );
    }

    #[test]
    fn test_created_comment_ignores_extra_fields() {
        let created: CreatedComment =
            serde_json::from_value(json!({"id": 12, "version": 0, "text": "x"})).unwrap();
        assert_eq!(created.id, Some(12));
    }
}
