use crate::server::{ApiError, Result, ServerRouter, json::Json};
use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::routing::{RouterExt, TypedPath};
use postboard_common::model::{
    PostId,
    post::{CreatePost, Post, PostPatch},
    sort::{SortDirection, SortField},
};
use postboard_store::store::{PostStore, UpdateError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
        .typed_get(search_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts")]
struct PostsPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct ListPostsQuery {
    sort: Option<String>,
    direction: Option<String>,
}

impl ListPostsQuery {
    /// Validates the sort parameters. The direction is only looked at when
    /// a sort field is present; a stray `direction` on its own is ignored,
    /// as the original service did.
    fn sort(self) -> Result<Option<(SortField, SortDirection)>> {
        let Some(field) = self.sort else {
            return Ok(None);
        };

        let field: SortField = field.parse()?;
        let direction = match self.direction {
            Some(direction) => direction.parse::<SortDirection>()?,
            None => SortDirection::default(),
        };

        Ok(Some((field, direction)))
    }
}

async fn list_posts(
    PostsPath: PostsPath,
    State(store): State<Arc<PostStore>>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<Post>>> {
    let sort = query.sort()?;

    Ok(Json(store.list(sort)))
}

async fn create_post(
    PostsPath: PostsPath,
    State(store): State<Arc<PostStore>>,
    Json(body): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>)> {
    let (title, content) = body.into_fields().ok_or(ApiError::MissingPostFields)?;

    let post = store.create(title, content);

    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts/{id}", rejection(ApiError))]
struct PostByIdPath {
    id: PostId,
}

async fn update_post(
    PostByIdPath { id }: PostByIdPath,
    State(store): State<Arc<PostStore>>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>> {
    let post = store.update(id, patch).map_err(|error| match error {
        UpdateError::NotFound(id) => ApiError::PostNotFound(id),
        UpdateError::EmptyPatch => ApiError::EmptyBody,
    })?;

    Ok(Json(post))
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
struct DeleteConfirmation {
    message: String,
}

async fn delete_post(
    PostByIdPath { id }: PostByIdPath,
    State(store): State<Arc<PostStore>>,
) -> Result<Json<DeleteConfirmation>> {
    let post = store.delete(id).ok_or(ApiError::PostNotFound(id))?;

    Ok(Json(DeleteConfirmation {
        message: format!("Post with id {} has been deleted successfully.", post.id),
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts/search")]
struct SearchPostsPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct SearchPostsQuery {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

async fn search_posts(
    SearchPostsPath: SearchPostsPath,
    State(store): State<Arc<PostStore>>,
    Query(query): Query<SearchPostsQuery>,
) -> Json<Vec<Post>> {
    Json(store.search(&query.title, &query.content))
}

#[cfg(test)]
mod tests {
    use crate::server::tests::{app, body_json};
    use crate::server::{ServerState, routes};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use postboard_common::model::PostId;
    use postboard_common::model::post::Post;
    use postboard_store::store::PostStore;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(posts: Vec<Post>) -> Router {
        let state = ServerState {
            store: Arc::new(PostStore::with_posts(posts)),
        };
        routes().with_state(state)
    }

    fn post(id: u64, title: &str, content: &str) -> Post {
        Post {
            id: PostId::new(id),
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn list_returns_seed_posts_in_insertion_order() {
        let response = app().oneshot(get("/api/posts")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([
                {"id": 1, "title": "First post", "content": "This is the first post."},
                {"id": 2, "title": "Second post", "content": "This is the second post."},
            ])
        );
    }

    #[tokio::test]
    async fn list_sorts_case_insensitively() {
        let app = app_with(vec![post(1, "Banana", "b"), post(2, "apple", "a")]);

        let response = app
            .clone()
            .oneshot(get("/api/posts?sort=title"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let titles: Vec<Value> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].clone())
            .collect();
        assert_eq!(titles, [json!("apple"), json!("Banana")]);

        let response = app
            .oneshot(get("/api/posts?sort=title&direction=desc"))
            .await
            .unwrap();
        let titles: Vec<Value> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].clone())
            .collect();
        assert_eq!(titles, [json!("Banana"), json!("apple")]);
    }

    #[tokio::test]
    async fn list_rejects_unknown_sort_field() {
        let response = app().oneshot(get("/api/posts?sort=bogus")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Invalid sort parameter. Please use 'title' or 'content'."})
        );
    }

    #[tokio::test]
    async fn list_rejects_unknown_direction() {
        let response = app()
            .oneshot(get("/api/posts?sort=title&direction=sideways"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Invalid direction parameter. Direction must be either 'asc' or 'desc'."})
        );
    }

    #[tokio::test]
    async fn stray_direction_without_sort_is_ignored() {
        let response = app()
            .oneshot(get("/api/posts?direction=sideways"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_assigns_next_id_and_round_trips() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                json!({"title": "T", "content": "C"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"id": 3, "title": "T", "content": "C"})
        );

        let response = app.oneshot(get("/api/posts")).await.unwrap();
        let posts = body_json(response).await;
        assert_eq!(
            posts.as_array().unwrap().last().unwrap(),
            &json!({"id": 3, "title": "T", "content": "C"})
        );
    }

    #[tokio::test]
    async fn create_on_empty_store_assigns_id_one() {
        let response = app_with(Vec::new())
            .oneshot(json_request(
                "POST",
                "/api/posts",
                json!({"title": "T", "content": "C"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["id"], json!(1));
    }

    #[tokio::test]
    async fn create_without_content_is_rejected() {
        let response = app()
            .oneshot(json_request("POST", "/api/posts", json!({"title": "T"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Title and content are required"})
        );
    }

    #[tokio::test]
    async fn create_accepts_empty_strings() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                json!({"title": "", "content": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn update_merges_partial_body() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/posts/1", json!({"title": "New"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": 1, "title": "New", "content": "This is the first post."})
        );
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let response = app()
            .oneshot(json_request("PUT", "/api/posts/99", json!({"title": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "Not Found"}));
    }

    #[tokio::test]
    async fn update_with_empty_body_is_rejected() {
        let response = app()
            .oneshot(json_request("PUT", "/api/posts/1", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No data provided"})
        );
    }

    #[tokio::test]
    async fn update_may_overwrite_id() {
        let response = app()
            .oneshot(json_request("PUT", "/api/posts/1", json!({"id": 9})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], json!(9));
    }

    #[tokio::test]
    async fn delete_removes_post_and_reports_it() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::delete("/api/posts/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Post with id 2 has been deleted successfully."})
        );

        let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!([
                {"id": 1, "title": "First post", "content": "This is the first post."},
            ])
        );

        let response = app
            .oneshot(
                Request::delete("/api/posts/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_matches_title_case_insensitively() {
        let response = app()
            .oneshot(get("/api/posts/search?title=FIRST"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([
                {"id": 1, "title": "First post", "content": "This is the first post."},
            ])
        );
    }

    #[tokio::test]
    async fn search_without_queries_matches_nothing() {
        let response = app().oneshot(get("/api/posts/search")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
}
