//! PostgREST-style HTTP query service (the hosted `complaints` table).
//!
//! Predicates travel as `column=op.value` query parameters, the window as
//! `offset`/`limit`, the ordering as `order=column.desc`.

use async_trait::async_trait;
use common::model::complaint::Complaint;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value};
use std::time::Duration;

use super::{Column, ComplaintQuery, ComplaintSource, Predicate};
use crate::error::QueryError;

const TABLE_PATH: &str = "/rest/v1/complaints";

pub struct RestSource {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestSource {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, QueryError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TABLE_PATH),
            api_key,
        })
    }

    fn request(&self, select: &str, query: &ComplaintQuery) -> RequestBuilder {
        let mut builder = self
            .http
            .get(&self.endpoint)
            .query(&query_params(select, query));
        if let Some(key) = &self.api_key {
            builder = builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }
        builder
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, QueryError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Encodes a query the way PostgREST expects it.
fn query_params(select: &str, query: &ComplaintQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select.to_string())];
    for predicate in &query.predicates {
        let (op, value) = match predicate {
            Predicate::Gte(_, v) => ("gte", v),
            Predicate::Lte(_, v) => ("lte", v),
            Predicate::ILike(_, v) => ("ilike", v),
            Predicate::Eq(_, v) => ("eq", v),
        };
        params.push((predicate.column().as_str().to_string(), format!("{}.{}", op, value)));
    }
    let direction = if query.order.ascending { "asc" } else { "desc" };
    params.push((
        "order".to_string(),
        format!("{}.{}", query.order.column.as_str(), direction),
    ));
    params.push(("offset".to_string(), query.window.offset.to_string()));
    params.push(("limit".to_string(), query.window.limit.to_string()));
    params
}

#[async_trait]
impl ComplaintSource for RestSource {
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>, QueryError> {
        debug!("GET {} window {:?}", self.endpoint, query.window);
        self.send(self.request("*", query)).await
    }

    async fn fetch_column(
        &self,
        column: Column,
        query: &ComplaintQuery,
    ) -> Result<Vec<Option<String>>, QueryError> {
        let rows: Vec<Map<String, Value>> = self.send(self.request(column.as_str(), query)).await?;
        Ok(rows
            .into_iter()
            .map(|mut row| match row.remove(column.as_str()) {
                Some(Value::String(s)) => Some(s),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .collect())
    }
}
