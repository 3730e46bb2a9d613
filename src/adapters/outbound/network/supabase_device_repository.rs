use super::postgrest_client::{eq, Params, PostgrestClient};
use crate::ports::outbound::{DeviceFilter, DeviceRepository, DeviceSearch};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::Device;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const TABLE: &str = "devices";

/// Columns matched by a general search
const GENERAL_SEARCH_COLUMNS: [&str; 6] = [
    "name",
    "hostname",
    "brand",
    "model",
    "location",
    "serial_number",
];

/// `ilike` operand matching `term` literally anywhere. LIKE wildcards in the
/// term are escaped, then the value is double-quoted so commas and
/// parentheses in user input cannot break an `or=(...)` expression.
fn contains_pattern(term: &str) -> String {
    let literal = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let quoted = literal.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", quoted)
}

/// SupabaseDeviceRepository adapter implementing the DeviceRepository port
/// against the `devices` table.
pub struct SupabaseDeviceRepository {
    client: Arc<PostgrestClient>,
}

impl SupabaseDeviceRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }

    fn filter_params(filter: &DeviceFilter) -> Params {
        let mut params = Params::new();
        if let Some(active) = filter.is_active {
            params.push(eq("is_active", active));
        }
        if let Some(user_id) = filter.user_id {
            params.push(eq("user_id", user_id));
        }
        params
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Device>> {
        let params = vec![
            ("select".to_string(), "*".to_string()),
            eq(column, value),
            ("limit".to_string(), "1".to_string()),
        ];
        let rows: Vec<Device> = self.client.select(TABLE, &params).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl DeviceRepository for SupabaseDeviceRepository {
    async fn insert(&self, device: Device) -> Result<Device> {
        self.client.insert(TABLE, &device).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Device>> {
        self.find_one("id", &id.to_string()).await
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Device>> {
        self.find_one("hostname", hostname).await
    }

    async fn find_by_serial_number(&self, serial_number: &str) -> Result<Option<Device>> {
        self.find_one("serial_number", serial_number).await
    }

    async fn list(&self, filter: &DeviceFilter) -> Result<Vec<Device>> {
        let mut params = Self::filter_params(filter);
        params.push(("order".to_string(), "created_at.desc".to_string()));
        params.push(("offset".to_string(), filter.skip.to_string()));
        if let Some(limit) = filter.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        self.client.select(TABLE, &params).await
    }

    async fn count(&self, filter: &DeviceFilter) -> Result<usize> {
        let mut params = Self::filter_params(filter);
        params.push(("select".to_string(), "id".to_string()));
        params.push(("limit".to_string(), "1".to_string()));
        let (_, total): (Vec<serde_json::Value>, usize) =
            self.client.select_with_count(TABLE, &params).await?;
        Ok(total)
    }

    async fn update(&self, device: Device) -> Result<Device> {
        let id = device.id;
        let rows: Vec<Device> = self
            .client
            .update(TABLE, &vec![eq("id", id)], &device)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| VulnTrackError::not_found("Device", id).into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &vec![eq("id", id)]).await?;
        Ok(!rows.is_empty())
    }

    async fn search(&self, search: &DeviceSearch) -> Result<Vec<Device>> {
        let mut params: Params = match search {
            DeviceSearch::ByName(name) => {
                vec![("name".to_string(), format!("ilike.{}", contains_pattern(name)))]
            }
            DeviceSearch::ByVersion(version) => vec![eq("version", version.trim())],
            DeviceSearch::ByBrand { brand, model } => {
                let mut params =
                    vec![("brand".to_string(), format!("ilike.{}", contains_pattern(brand)))];
                if let Some(model) = model {
                    params.push(("model".to_string(), format!("ilike.{}", contains_pattern(model))));
                }
                params
            }
            DeviceSearch::General(term) => {
                let pattern = contains_pattern(term);
                let clauses: Vec<String> = GENERAL_SEARCH_COLUMNS
                    .iter()
                    .map(|column| format!("{}.ilike.{}", column, pattern))
                    .collect();
                vec![("or".to_string(), format!("({})", clauses.join(",")))]
            }
        };
        params.push(("order".to_string(), "created_at.desc".to_string()));
        self.client.select(TABLE, &params).await
    }
}
