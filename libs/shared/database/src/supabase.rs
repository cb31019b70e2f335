use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin client over the Supabase REST and auth APIs.
/// Every cell talks to the document store through this type.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // PostgREST returns the affected rows when asked
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        if let Some(token) = auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.get_headers(auth_token);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Select rows from a table using a raw PostgREST filter string.
    pub async fn select_rows(
        &self,
        table: &str,
        filter: &str,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = if filter.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, filter)
        };

        self.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Select a single row, erroring when nothing matches.
    pub async fn select_one(&self, table: &str, filter: &str, auth_token: &str) -> Result<Value> {
        let rows = self.select_rows(table, filter, auth_token).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Resource not found: no {} row matching {}", table, filter))
    }

    /// Insert a row and return the stored representation.
    pub async fn insert_row(&self, table: &str, row: Value, auth_token: &str) -> Result<Value> {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<Value> = self
            .request(Method::POST, &path, Some(auth_token), Some(row))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no representation", table))
    }

    /// Patch all rows matching the filter and return them.
    pub async fn update_rows(
        &self,
        table: &str,
        filter: &str,
        patch: Value,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = format!("/rest/v1/{}?{}", table, filter);
        self.request(Method::PATCH, &path, Some(auth_token), Some(patch))
            .await
    }

    /// Fetch the authenticated user's record from the Supabase auth API.
    pub async fn get_user_profile(&self, auth_token: &str) -> Result<Value> {
        self.request(Method::GET, "/auth/v1/user", Some(auth_token), None)
            .await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
