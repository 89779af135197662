use postboard_common::model::{
    PostId,
    post::{Post, PostPatch},
    sort::{SortDirection, SortField},
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub type Result<T, E = UpdateError> = std::result::Result<T, E>;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum UpdateError {
    #[error("Post with id {0} was not found")]
    NotFound(PostId),
    #[error("The patch contained no fields")]
    EmptyPatch,
}

/// The process-wide in-memory collection of posts.
///
/// Insertion order is the canonical order: listing and searching iterate
/// it as-is, and deletion preserves the order of the remaining posts.
/// All access goes through one mutex; no method holds the lock across
/// anything that can block, so handlers may call in from any task.
#[derive(Debug, Default)]
pub struct PostStore {
    inner: Mutex<Vec<Post>>,
}

impl PostStore {
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            inner: Mutex::new(posts),
        }
    }

    /// The startup collection: two seed posts, matching a fresh deployment.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_posts(vec![
            Post {
                id: PostId::new(1),
                title: "First post".to_owned(),
                content: "This is the first post.".to_owned(),
            },
            Post {
                id: PostId::new(2),
                title: "Second post".to_owned(),
                content: "This is the second post.".to_owned(),
            },
        ])
    }

    // A poisoned lock still holds consistent data (every mutation is a
    // single list operation), so poisoning is absorbed rather than
    // propagated.
    fn lock(&self) -> MutexGuard<'_, Vec<Post>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All posts, in insertion order, optionally sorted.
    ///
    /// Sorting is a stable case-insensitive lexicographic sort on the
    /// chosen field; posts with equal keys keep insertion order in both
    /// directions.
    #[must_use]
    pub fn list(&self, sort: Option<(SortField, SortDirection)>) -> Vec<Post> {
        let mut posts = self.lock().clone();

        if let Some((field, direction)) = sort {
            posts.sort_by(|a, b| {
                let ordering = field.key(a).to_lowercase().cmp(&field.key(b).to_lowercase());
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        posts
    }

    /// Appends a new post, assigning `max(existing ids) + 1` (or 1 when
    /// the collection is empty), and returns it.
    pub fn create(&self, title: String, content: String) -> Post {
        let mut posts = self.lock();

        let id = posts
            .iter()
            .map(|post| post.id)
            .max()
            .map_or_else(|| PostId::new(1), PostId::next);

        let post = Post { id, title, content };
        posts.push(post.clone());
        post
    }

    /// Merges the patch into the post with the given id and returns the
    /// updated post. Not-found wins over an empty patch, matching the
    /// original request-handling order.
    pub fn update(&self, id: PostId, patch: PostPatch) -> Result<Post> {
        let mut posts = self.lock();

        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(UpdateError::NotFound(id))?;

        if patch.is_empty() {
            return Err(UpdateError::EmptyPatch);
        }

        post.apply(patch);
        Ok(post.clone())
    }

    /// Removes and returns the post with the given id.
    pub fn delete(&self, id: PostId) -> Option<Post> {
        let mut posts = self.lock();
        let index = posts.iter().position(|post| post.id == id)?;
        Some(posts.remove(index))
    }

    /// Posts whose title contains the non-empty title query, or whose
    /// content contains the non-empty content query, case-insensitively.
    /// Two empty queries match nothing.
    #[must_use]
    pub fn search(&self, title_query: &str, content_query: &str) -> Vec<Post> {
        let title_query = title_query.to_lowercase();
        let content_query = content_query.to_lowercase();

        self.lock()
            .iter()
            .filter(|post| {
                let title_matches =
                    !title_query.is_empty() && post.title.to_lowercase().contains(&title_query);
                let content_matches = !content_query.is_empty()
                    && post.content.to_lowercase().contains(&content_query);

                title_matches || content_matches
            })
            .cloned()
            .collect()
    }
}
