use crate::model::PostId;
use serde::{Deserialize, Serialize};

/// The sole domain entity: an id/title/content record.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
}

/// Request body for creating a post.
///
/// Both fields are optional at the wire level so that presence can be
/// validated at the request boundary with the service's own error message
/// rather than a deserialization rejection. Empty strings are accepted.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct CreatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl CreatePost {
    /// Returns `(title, content)` if both keys were present.
    #[must_use]
    pub fn into_fields(self) -> Option<(String, String)> {
        Some((self.title?, self.content?))
    }
}

/// Partial update for a post. Every supplied field overwrites the
/// corresponding field of the stored post.
///
/// `id` is deliberately patchable: the original service merged arbitrary
/// request keys into the stored record, so overwriting a post's id (and
/// thereby creating duplicate or mismatched ids) is reachable behavior
/// that is kept rather than silently fixed. Unknown keys in the request
/// body are ignored since a typed record cannot carry them.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PostPatch {
    pub id: Option<PostId>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// True when no recognized field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none() && self.content.is_none()
    }
}

impl Post {
    /// Merges the patch into this post, overwriting supplied fields.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}
