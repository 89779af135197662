pub mod post;
pub mod sort;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a post. Serialized as a bare positive integer.
///
/// Ids are assigned by the store as `max(existing ids) + 1`, so they are
/// unique within the collection at any point in time but not monotonic
/// across deletions: removing the highest-id post frees its id for the
/// next create.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<PostId> for u64 {
    fn from(value: PostId) -> Self {
        value.get()
    }
}
