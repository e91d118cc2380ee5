use super::{RemoteStore, Result, StoreError};
use crate::models::{DailyPracticeRow, GoalRow, WeeklyTargetRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::json;

/// Client for a PostgREST-style table API (e.g. a hosted `/rest/v1` endpoint).
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn patch_goal(&self, goal_id: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .request(Method::PATCH, "goals")
            .query(&[("goal_id", format!("eq.{goal_id}"))])
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn fetch_weekly_targets(&self) -> Result<Vec<WeeklyTargetRow>> {
        let response = self
            .request(Method::GET, "weekly_targets")
            .query(&[("select", "*")])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn fetch_goals(&self) -> Result<Vec<GoalRow>> {
        let response = self
            .request(Method::GET, "goals")
            .query(&[("select", "*")])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn fetch_daily_practice(&self, since: NaiveDate) -> Result<Vec<DailyPracticeRow>> {
        let response = self
            .request(Method::GET, "daily_practice")
            .query(&[
                ("select", "*".to_string()),
                ("practice_date", format!("gte.{since}")),
            ])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn upsert_daily_minutes(
        &self,
        date: NaiveDate,
        category: &str,
        minutes: u32,
    ) -> Result<()> {
        let row = DailyPracticeRow {
            practice_date: date,
            practice_type: category.to_string(),
            minutes,
        };
        let response = self
            .request(Method::POST, "daily_practice")
            .query(&[("on_conflict", "practice_date,practice_type")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn upsert_goal_progress(&self, goal_id: &str, progress: u32) -> Result<()> {
        self.patch_goal(goal_id, json!({ "progress": progress })).await
    }

    async fn upsert_goal_title(&self, goal_id: &str, title: &str) -> Result<()> {
        self.patch_goal(goal_id, json!({ "title": title })).await
    }

    async fn delete_practice_for_date(&self, date: NaiveDate) -> Result<()> {
        let response = self
            .request(Method::DELETE, "daily_practice")
            .query(&[("practice_date", format!("eq.{date}"))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
