use reqwest::{Method, Url};
use serde_json::Value;

use crate::domain::repository::RecordStore;
use crate::domain::types::RowFilter;
use crate::error::AuthServiceError;
use crate::infra::supabase::{ApiFailure, SupabaseClient};

/// Supabase PostgREST implementation of [`RecordStore`]. Uses the
/// service-role client, so row-level security does not apply.
#[derive(Clone)]
pub struct SupabaseRecordStore {
    pub client: SupabaseClient,
}

fn store_error(context: &str, err: impl std::fmt::Display) -> AuthServiceError {
    AuthServiceError::RecordStore(format!("{context}: {err}"))
}

impl SupabaseRecordStore {
    fn table_url(&self, table: &str) -> Result<Url, AuthServiceError> {
        self.client
            .url_with_segment("/rest/v1", table)
            .map_err(|e| store_error(table, format!("{e:#}")))
    }

    fn filtered_url(&self, table: &str, filter: &RowFilter) -> Result<Url, AuthServiceError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(&filter.column, &format!("eq.{}", filter.value));
        Ok(url)
    }
}

impl RecordStore for SupabaseRecordStore {
    async fn insert(&self, table: &str, row: &Value) -> Result<Value, AuthServiceError> {
        let url = self.table_url(table)?;
        let resp = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| store_error(table, e))?;
        if !resp.status().is_success() {
            return Err(store_error(table, ApiFailure::from_response(resp).await));
        }
        let mut rows: Vec<Value> = resp.json().await.map_err(|e| store_error(table, e))?;
        Ok(if rows.is_empty() {
            row.clone()
        } else {
            rows.swap_remove(0)
        })
    }

    async fn select(
        &self,
        table: &str,
        filter: &RowFilter,
    ) -> Result<Vec<Value>, AuthServiceError> {
        let mut url = self.filtered_url(table, filter)?;
        url.query_pairs_mut().append_pair("select", "*");
        let resp = self
            .client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| store_error(table, e))?;
        if !resp.status().is_success() {
            return Err(store_error(table, ApiFailure::from_response(resp).await));
        }
        resp.json().await.map_err(|e| store_error(table, e))
    }

    async fn delete(&self, table: &str, filter: &RowFilter) -> Result<(), AuthServiceError> {
        let url = self.filtered_url(table, filter)?;
        let resp = self
            .client
            .request(Method::DELETE, url)
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| store_error(table, e))?;
        if !resp.status().is_success() {
            return Err(store_error(table, ApiFailure::from_response(resp).await));
        }
        Ok(())
    }
}
