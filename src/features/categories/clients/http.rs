use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::config::UpstreamConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryListQuery, CategoryPage, CategoryTree, NewCategory,
};

/// Whether a failed call was a read or a write; decides the error variant
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Fetch,
    Mutation,
}

impl CallKind {
    fn error(self, message: String) -> AppError {
        match self {
            CallKind::Fetch => AppError::FetchFailed(message),
            CallKind::Mutation => AppError::MutationFailed(message),
        }
    }
}

/// Client for the procurement backend category endpoints
pub struct HttpCategoryApi {
    base_url: String,
    api_token: Option<String>,
    http_client: reqwest::Client,
}

impl HttpCategoryApi {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, kind: CallKind, what: &str) -> Result<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!("Failed to {}: {}", what, e);
            kind.error(format!("Failed to {}: {}", what, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Category API error while trying to {}: HTTP {} - {}", what, status, body);

        if status == StatusCode::NOT_FOUND && matches!(kind, CallKind::Mutation) {
            return Err(AppError::NotFound(format!("Category not found ({})", what)));
        }

        Err(kind.error(format!("HTTP {} - {}", status, body)))
    }

    async fn decode<T: DeserializeOwned>(response: Response, kind: CallKind, what: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response to {}: {}", what, e);
            kind.error(format!("Failed to parse response to {}: {}", what, e))
        })
    }
}

#[async_trait]
impl CategoryApi for HttpCategoryApi {
    async fn get_category_tree(&self, department_id: Uuid) -> Result<CategoryTree> {
        let url = self.url("/categories/tree");
        tracing::debug!("Fetching category tree for department {}", department_id);

        let request = self
            .http_client
            .get(&url)
            .query(&[("departmentId", department_id.to_string())]);
        let response = self
            .send(request, CallKind::Fetch, "fetch category tree")
            .await?;

        Self::decode(response, CallKind::Fetch, "fetch category tree").await
    }

    async fn get_all_categories(&self, query: &CategoryListQuery) -> Result<CategoryPage> {
        let url = self.url("/categories");
        tracing::debug!("Fetching category page: {:?}", query);

        let request = self.http_client.get(&url).query(query);
        let response = self
            .send(request, CallKind::Fetch, "fetch categories")
            .await?;

        Self::decode(response, CallKind::Fetch, "fetch categories").await
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        let url = self.url("/categories");
        tracing::debug!(
            "Creating category '{}' in department {}",
            input.name,
            input.department_id
        );

        let request = self.http_client.post(&url).json(&input);
        let response = self
            .send(request, CallKind::Mutation, "create category")
            .await?;

        Self::decode(response, CallKind::Mutation, "create category").await
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Category> {
        let url = self.url(&format!("/categories/{}", id));
        tracing::debug!("Updating category {}", id);

        let request = self.http_client.patch(&url).json(&changes);
        let response = self
            .send(request, CallKind::Mutation, "update category")
            .await?;

        Self::decode(response, CallKind::Mutation, "update category").await
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        let url = self.url(&format!("/categories/{}", id));
        tracing::debug!("Deleting category {}", id);

        self.send(
            self.http_client.delete(&url),
            CallKind::Mutation,
            "delete category",
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::core::config::UpstreamMode;

    const TOKEN: &str = "procurement-token";

    /// Serves `router` on an ephemeral port and points a client at it
    async fn client_for(router: Router) -> HttpCategoryApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        HttpCategoryApi::new(&UpstreamConfig {
            mode: UpstreamMode::Http,
            base_url: format!("http://{}/api/", addr),
            api_token: Some(TOKEN.to_string()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn failing_upstream(status: AxumStatus) -> Router {
        Router::new().fallback(move || async move { (status, "upstream exploded") })
    }

    fn category_json(id: Uuid, department_id: Uuid, parent_id: Option<Uuid>, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "departmentId": department_id,
            "parentId": parent_id,
            "updatedAt": "2025-03-01T08:30:00Z"
        })
    }

    fn is_authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {}", TOKEN))
    }

    #[tokio::test]
    async fn test_page_request_sends_token_and_camel_case_query() {
        let department_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let router = Router::new().route(
            "/api/categories",
            get(move |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                if !is_authorized(&headers) {
                    return Err(AxumStatus::UNAUTHORIZED);
                }
                let expected_department = department_id.to_string();
                if query.get("departmentId") != Some(&expected_department)
                    || query.get("page").map(String::as_str) != Some("2")
                    || query.get("limit").map(String::as_str) != Some("1")
                    || query.get("search").map(String::as_str) != Some("lap tops")
                {
                    return Err(AxumStatus::BAD_REQUEST);
                }
                Ok(Json(json!({
                    "data": [category_json(category_id, department_id, None, "Laptops")],
                    "meta": { "total": 3, "page": 2, "limit": 1, "totalPages": 3 }
                })))
            }),
        );
        let api = client_for(router).await;

        let page = api
            .get_all_categories(&CategoryListQuery {
                department_id: Some(department_id),
                page: Some(2),
                limit: Some(1),
                search: Some("lap tops".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, category_id);
        assert_eq!(page.data[0].department_id, department_id);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.total, 3);
    }

    #[tokio::test]
    async fn test_tree_decodes_nested_children() {
        let department_id = Uuid::now_v7();
        let (hardware, monitors) = (Uuid::now_v7(), Uuid::now_v7());
        let router = Router::new().route(
            "/api/categories/tree",
            get(move || async move {
                let mut root = category_json(hardware, department_id, None, "Hardware");
                let mut child = category_json(monitors, department_id, Some(hardware), "Monitors");
                child["children"] = json!([]);
                root["children"] = json!([child]);
                Json(json!([root]))
            }),
        );
        let api = client_for(router).await;

        let tree = api.get_category_tree(department_id).await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.name, "Hardware");
        assert_eq!(tree[0].children[0].category.parent_id, Some(hardware));
    }

    #[tokio::test]
    async fn test_create_posts_camel_case_body() {
        let department_id = Uuid::now_v7();
        let parent_id = Uuid::now_v7();
        let router = Router::new().route(
            "/api/categories",
            axum::routing::post(move |Json(body): Json<Value>| async move {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                let created = category_json(
                    Uuid::now_v7(),
                    body["departmentId"].as_str().unwrap_or_default().parse().unwrap_or_default(),
                    body["parentId"].as_str().and_then(|p| p.parse().ok()),
                    &name,
                );
                (AxumStatus::CREATED, Json(created))
            }),
        );
        let api = client_for(router).await;

        let created = api
            .create_category(NewCategory {
                name: "Docking Stations".to_string(),
                description: None,
                department_id,
                parent_id: Some(parent_id),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Docking Stations");
        assert_eq!(created.department_id, department_id);
        assert_eq!(created.parent_id, Some(parent_id));
    }

    #[tokio::test]
    async fn test_server_errors_map_by_call_kind() {
        let api = client_for(failing_upstream(AxumStatus::INTERNAL_SERVER_ERROR)).await;
        let id = Uuid::now_v7();

        assert!(matches!(
            api.get_category_tree(id).await,
            Err(AppError::FetchFailed(_))
        ));
        assert!(matches!(
            api.get_all_categories(&CategoryListQuery::default()).await,
            Err(AppError::FetchFailed(_))
        ));
        assert!(matches!(
            api.create_category(NewCategory {
                name: "Chairs".to_string(),
                description: None,
                department_id: id,
                parent_id: None,
            })
            .await,
            Err(AppError::MutationFailed(_))
        ));
        assert!(matches!(
            api.update_category(id, CategoryChanges::default()).await,
            Err(AppError::MutationFailed(_))
        ));
        assert!(matches!(
            api.delete_category(id).await,
            Err(AppError::MutationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_not_found_only_maps_for_writes() {
        let api = client_for(failing_upstream(AxumStatus::NOT_FOUND)).await;
        let id = Uuid::now_v7();

        assert!(matches!(
            api.get_category_tree(id).await,
            Err(AppError::FetchFailed(_))
        ));
        assert!(matches!(
            api.update_category(id, CategoryChanges::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            api.delete_category(id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_fetch_failure() {
        let router = Router::new().route("/api/categories", get(|| async { "not json" }));
        let api = client_for(router).await;

        assert!(matches!(
            api.get_all_categories(&CategoryListQuery::default()).await,
            Err(AppError::FetchFailed(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = UpstreamConfig {
            mode: UpstreamMode::Http,
            base_url: "http://procurement.local/api/".to_string(),
            api_token: None,
            timeout: Duration::from_secs(5),
        };

        let api = HttpCategoryApi::new(&config).expect("client builds");

        assert_eq!(api.base_url(), "http://procurement.local/api");
        assert_eq!(
            api.url("/categories"),
            "http://procurement.local/api/categories"
        );
    }

    #[test]
    fn test_call_kind_maps_error_variant() {
        assert!(matches!(
            CallKind::Fetch.error("x".to_string()),
            AppError::FetchFailed(_)
        ));
        assert!(matches!(
            CallKind::Mutation.error("x".to_string()),
            AppError::MutationFailed(_)
        ));
    }

    #[test]
    fn test_update_payload_distinguishes_unchanged_and_cleared_parent() {
        let unchanged = CategoryChanges {
            name: Some("Laptops".to_string()),
            ..Default::default()
        };
        let cleared = CategoryChanges {
            parent_id: Some(None),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&unchanged).unwrap(),
            serde_json::json!({ "name": "Laptops" })
        );
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            serde_json::json!({ "parentId": null })
        );
    }
}
