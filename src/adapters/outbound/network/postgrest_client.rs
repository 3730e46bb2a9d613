use super::retry::{describe, RetryPolicy};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const SERVICE: &str = "Supabase";

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
    pub timeout: Duration,
}

/// Query parameters in PostgREST syntax, e.g. `("id", "eq.<uuid>")`
pub type Params = Vec<(String, String)>;

/// `eq.` filter on a column
pub fn eq(column: &str, value: impl ToString) -> (String, String) {
    (column.to_string(), format!("eq.{}", value.to_string()))
}

/// Minimal client for the PostgREST API Supabase exposes under `/rest/v1`.
///
/// Sends the project key both as `apikey` and as a bearer token. A 409 from
/// a unique constraint is reported as `VulnTrackError::Conflict`.
pub struct PostgrestClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl PostgrestClient {
    pub fn new(settings: &SupabaseSettings, retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&settings.key).map_err(|_| VulnTrackError::Config {
            message: "SUPABASE_KEY contains characters not allowed in a header".to_string(),
            hint: "Copy the key again from the Supabase project settings".to_string(),
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.key)).map_err(|_| {
            VulnTrackError::Config {
                message: "SUPABASE_KEY cannot be used as a bearer token".to_string(),
                hint: "Copy the key again from the Supabase project settings".to_string(),
            }
        })?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", settings.url.trim_end_matches('/')),
            retry,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    pub async fn select<T: DeserializeOwned>(&self, table: &str, params: &Params) -> Result<Vec<T>> {
        let url = self.table_url(table);
        let response = self
            .run(|| self.client.get(&url).query(params))
            .await?;
        Self::rows(response).await
    }

    /// Selects one page and the exact number of rows matching the filters.
    pub async fn select_with_count<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &Params,
    ) -> Result<(Vec<T>, usize)> {
        let url = self.table_url(table);
        let response = self
            .run(|| {
                self.client
                    .get(&url)
                    .header("Prefer", "count=exact")
                    .query(params)
            })
            .await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        let rows: Vec<T> = Self::rows(response).await?;
        let total = total.unwrap_or(rows.len());
        Ok((rows, total))
    }

    pub async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.table_url(table);
        let response = self
            .run(|| {
                self.client
                    .post(&url)
                    .header("Prefer", "return=representation")
                    .json(body)
            })
            .await?;
        Self::single(table, response).await
    }

    /// Updates the rows matching `filters` and returns them
    pub async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &Params,
        body: &B,
    ) -> Result<Vec<T>> {
        let url = self.table_url(table);
        let response = self
            .run(|| {
                self.client
                    .patch(&url)
                    .header("Prefer", "return=representation")
                    .query(filters)
                    .json(body)
            })
            .await?;
        Self::rows(response).await
    }

    /// Deletes the rows matching `filters` and returns them
    pub async fn delete<T: DeserializeOwned>(&self, table: &str, filters: &Params) -> Result<Vec<T>> {
        let url = self.table_url(table);
        let response = self
            .run(|| {
                self.client
                    .delete(&url)
                    .header("Prefer", "return=representation")
                    .query(filters)
            })
            .await?;
        Self::rows(response).await
    }

    async fn run<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.retry.execute(SERVICE, build).await?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::CONFLICT => Err(VulnTrackError::Conflict {
                message: format!("Duplicate value: {}", describe(response).await),
            }
            .into()),
            _ => Err(VulnTrackError::external(SERVICE, describe(response).await).into()),
        }
    }

    async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>> {
        response
            .json()
            .await
            .map_err(|e| VulnTrackError::external(SERVICE, format!("invalid response: {}", e)).into())
    }

    async fn single<T: DeserializeOwned>(table: &str, response: Response) -> Result<T> {
        let rows: Vec<T> = Self::rows(response).await?;
        rows.into_iter().next().ok_or_else(|| {
            VulnTrackError::external(SERVICE, format!("insert into {} returned no row", table)).into()
        })
    }
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`
fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: u32,
        name: String,
    }

    fn client(server: &MockServer) -> PostgrestClient {
        PostgrestClient::new(
            &SupabaseSettings {
                url: server.base_url(),
                key: "service-key".to_string(),
                timeout: Duration::from_secs(5),
            },
            RetryPolicy::none(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
    }

    #[tokio::test]
    async fn test_select_sends_auth_headers_and_filters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/devices")
                    .header("apikey", "service-key")
                    .header("authorization", "Bearer service-key")
                    .query_param("hostname", "eq.fw-01");
                then.status(200)
                    .json_body(serde_json::json!([{"id": 1, "name": "fw-01"}]));
            })
            .await;

        let rows: Vec<Row> = client(&server)
            .select("devices", &vec![eq("hostname", "fw-01")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            rows,
            vec![Row {
                id: 1,
                name: "fw-01".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_select_with_count_reads_content_range() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/scans")
                    .header("prefer", "count=exact");
                then.status(206)
                    .header("content-range", "0-0/17")
                    .json_body(serde_json::json!([{"id": 3, "name": "scan"}]));
            })
            .await;

        let (rows, total): (Vec<Row>, usize) = client(&server)
            .select_with_count("scans", &Vec::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(total, 17);
    }

    #[tokio::test]
    async fn test_insert_conflict_maps_to_conflict_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/devices");
                then.status(409).json_body(serde_json::json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint \"devices_hostname_key\""
                }));
            })
            .await;

        let err = client(&server)
            .insert::<_, Row>(
                "devices",
                &Row {
                    id: 1,
                    name: "fw-01".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VulnTrackError>(),
            Some(VulnTrackError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_returns_representation() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/devices")
                    .header("prefer", "return=representation")
                    .json_body(serde_json::json!({"id": 2, "name": "sw-02"}));
                then.status(201)
                    .json_body(serde_json::json!([{"id": 2, "name": "sw-02"}]));
            })
            .await;

        let row: Row = client(&server)
            .insert(
                "devices",
                &Row {
                    id: 2,
                    name: "sw-02".to_string(),
                },
            )
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(row.id, 2);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/rest/v1/devices")
                    .query_param("id", "eq.9");
                then.status(200).json_body(serde_json::json!([]));
            })
            .await;

        let removed: Vec<Row> = client(&server)
            .delete("devices", &vec![eq("id", 9)])
            .await
            .unwrap();
        assert!(removed.is_empty());
    }
}
