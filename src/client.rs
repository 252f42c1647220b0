//! HTTP client for the Datadog dashboard APIs.

use crate::config::ProviderConfig;
use crate::dashboard::{Dashboard, LayoutType};
use crate::error::ProviderError;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const API_KEY_HEADER: &str = "DD-API-KEY";
const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";

/// One dashboard reference in a dashboard list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardListItem {
    /// Dashboard ID.
    pub id: String,
    /// `custom_timeboard` or `custom_screenboard`.
    #[serde(rename = "type")]
    pub dashboard_type: String,
}

/// Body of the dashboard list add and remove calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardListItems {
    /// Dashboards to add or remove.
    pub dashboards: Vec<DashboardListItem>,
}

impl DashboardListItems {
    /// Items naming a single dashboard.
    pub fn single(dashboard_id: impl Into<String>, layout_type: LayoutType) -> Self {
        Self {
            dashboards: vec![DashboardListItem {
                id: dashboard_id.into(),
                dashboard_type: layout_type.dashboard_list_type().to_string(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    valid: bool,
}

/// Client for the dashboard and dashboard list endpoints.
#[derive(Clone)]
pub struct DatadogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

impl fmt::Debug for DatadogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DatadogClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            app_key: config.app_key.clone(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the API key is valid.
    pub async fn validate(&self) -> Result<(), ProviderError> {
        let response: ValidateResponse = self.call(Method::GET, "/api/v1/validate", None::<&()>).await?;
        if response.valid {
            Ok(())
        } else {
            Err(ProviderError::PermissionDenied(
                "invalid or missing credentials provided to the Datadog provider".to_string(),
            ))
        }
    }

    /// `POST /api/v1/dashboard`
    pub async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<Dashboard, ProviderError> {
        self.call(Method::POST, "/api/v1/dashboard", Some(dashboard))
            .await
    }

    /// `GET /api/v1/dashboard/{id}`
    pub async fn get_dashboard(&self, id: &str) -> Result<Dashboard, ProviderError> {
        self.call(Method::GET, &dashboard_path(id), None::<&()>)
            .await
    }

    /// `PUT /api/v1/dashboard/{id}`
    pub async fn update_dashboard(
        &self,
        id: &str,
        dashboard: &Dashboard,
    ) -> Result<Dashboard, ProviderError> {
        self.call(Method::PUT, &dashboard_path(id), Some(dashboard))
            .await
    }

    /// `DELETE /api/v1/dashboard/{id}`
    pub async fn delete_dashboard(&self, id: &str) -> Result<(), ProviderError> {
        self.send(self.request(Method::DELETE, &dashboard_path(id)))
            .await
            .map(drop)
    }

    /// Add dashboards to a manual dashboard list.
    pub async fn add_dashboard_list_items(
        &self,
        list_id: i64,
        items: &DashboardListItems,
    ) -> Result<(), ProviderError> {
        let request = self
            .request(Method::POST, &dashboard_list_path(list_id))
            .json(items);
        self.send(request).await.map(drop)
    }

    /// Remove dashboards from a manual dashboard list.
    pub async fn delete_dashboard_list_items(
        &self,
        list_id: i64,
        items: &DashboardListItems,
    ) -> Result<(), ProviderError> {
        let request = self
            .request(Method::DELETE, &dashboard_list_path(list_id))
            .json(items);
        self.send(request).await.map(drop)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "sending Datadog API request");
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
            .header(APP_KEY_HEADER, &self.app_key)
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Datadog API request failed");
        Err(ProviderError::from_status(status.as_u16(), &body))
    }
}

fn dashboard_path(id: &str) -> String {
    format!("/api/v1/dashboard/{}", id)
}

fn dashboard_list_path(list_id: i64) -> String {
    format!("/api/v2/dashboard/lists/manual/{}/dashboards", list_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DatadogClient {
        let config = ProviderConfig::new("api-key", "app-key").with_api_url(format!("{}/", server.uri()));
        DatadogClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_requests_carry_both_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/validate"))
            .and(header("DD-API-KEY", "api-key"))
            .and(header("DD-APPLICATION-KEY", "app-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).validate().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_keys_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/validate"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"errors": ["Forbidden"]})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).validate().await.unwrap_err();
        assert!(matches!(err, ProviderError::PermissionDenied(_)));
        assert_eq!(err.message(), "HTTP 403: Forbidden");
    }

    #[tokio::test]
    async fn test_get_dashboard_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/dashboard/abc-def-ghi"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"errors": ["Dashboard abc-def-ghi not found"]})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_dashboard("abc-def-ghi")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_dashboard_list_items_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/dashboard/lists/manual/42/dashboards"))
            .and(body_json(json!({
                "dashboards": [{"id": "abc-def-ghi", "type": "custom_screenboard"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"added_dashboards_to_list": []})))
            .expect(1)
            .mount(&server)
            .await;

        let items = DashboardListItems::single("abc-def-ghi", LayoutType::Free);
        client_for(&server)
            .add_dashboard_list_items(42, &items)
            .await
            .unwrap();
    }

    #[test]
    fn test_base_url_drops_trailing_slash() {
        let config = ProviderConfig::new("a", "b").with_api_url("https://api.datadoghq.eu/");
        let client = DatadogClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.datadoghq.eu");
    }
}
