use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::jobs::Job;
use super::logstorage::LogStorageMetadata;
use super::{IdList, Paging, PagingInfo};
use crate::client::{Client, Query, ToQuery};
use crate::error::{Result, RundeckError};

/// Outcome or state of an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    Aborted,
    Timedout,
    FailedWithRetry,
    Scheduled,
    /// Custom statuses and anything this client does not know.
    #[default]
    #[serde(other)]
    Other,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Aborted => "aborted",
            ExecutionStatus::Timedout => "timedout",
            ExecutionStatus::FailedWithRetry => "failed-with-retry",
            ExecutionStatus::Scheduled => "scheduled",
            ExecutionStatus::Other => "other",
        }
    }

    /// True once the execution can no longer change state.
    pub fn is_finished(&self) -> bool {
        !matches!(self, ExecutionStatus::Running | ExecutionStatus::Scheduled)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an execution was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionType {
    Scheduled,
    User,
    UserScheduled,
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionType::Scheduled => "scheduled",
            ExecutionType::User => "user",
            ExecutionType::UserScheduled => "user-scheduled",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionTimestamp {
    #[serde(rename = "unixtime")]
    pub unix_time: i64,
    pub date: Option<DateTime<Utc>>,
}

/// A single run of a job or adhoc command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Execution {
    pub id: i64,
    pub href: String,
    pub permalink: String,
    pub status: ExecutionStatus,
    pub custom_status: Option<String>,
    pub project: String,
    pub execution_type: Option<ExecutionType>,
    pub user: String,
    #[serde(rename = "serverUUID")]
    pub server_uuid: Option<String>,
    #[serde(rename = "date-started")]
    pub date_started: Option<ExecutionTimestamp>,
    #[serde(rename = "date-ended")]
    pub date_ended: Option<ExecutionTimestamp>,
    /// Absent for adhoc executions.
    pub job: Option<Job>,
    pub description: String,
    #[serde(rename = "argstring")]
    pub arg_string: Option<String>,
    pub storage: Option<LogStorageMetadata>,
    pub successful_nodes: Vec<String>,
    pub failed_nodes: Vec<String>,
    pub errors: Vec<String>,
}

/// A page of executions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionList {
    pub paging: PagingInfo,
    pub executions: Vec<Execution>,
}

/// Filters for the project execution query.
#[derive(Debug, Clone, Default)]
pub struct ExecutionQuery {
    pub status: Option<ExecutionStatus>,
    pub user: String,
    /// Relative period such as `1d` or `2w`.
    pub recent: String,
    pub job_ids: Vec<String>,
    pub execution_type: Option<ExecutionType>,
    pub paging: Paging,
}

impl ToQuery for ExecutionQuery {
    fn to_query(&self, query: &mut Query) {
        query
            .push_opt("statusFilter", self.status)
            .push_str("userFilter", &self.user)
            .push_str("recentFilter", &self.recent)
            .push_each("jobIdListFilter", &self.job_ids)
            .push_opt("executionTypeFilter", self.execution_type);
        self.paging.to_query(query);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbortResponse {
    pub abort: AbortStatus,
    pub execution: AbortedExecution,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbortStatus {
    /// `pending`, `failed`, or `aborted`.
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbortedExecution {
    pub id: String,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkDeleteExecutionsResponse {
    pub failures: Vec<BulkDeleteFailure>,
    pub failed_count: u64,
    pub success_count: u64,
    #[serde(rename = "allsuccessful")]
    pub all_successful: bool,
    pub request_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkDeleteFailure {
    pub id: String,
    pub message: String,
}

/// Execution endpoints.
pub struct Executions<'a> {
    client: &'a Client,
}

impl<'a> Executions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: i64) -> Result<Execution> {
        let c = self.client;
        let url = c.endpoint(["execution", id.to_string().as_str()])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Queries a project's executions.
    pub async fn list(&self, project: &str, query: &ExecutionQuery) -> Result<ExecutionList> {
        let c = self.client;
        let url = c.endpoint_with_query(
            ["project", project, "executions"],
            &Query::from_options(query),
        )?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn running(&self, project: &str) -> Result<ExecutionList> {
        let c = self.client;
        let url = c.endpoint(["project", project, "executions", "running"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Requests an abort, optionally on behalf of another user.
    pub async fn abort(&self, id: i64, as_user: Option<&str>) -> Result<AbortResponse> {
        let c = self.client;
        let mut query = Query::new();
        query.push_opt("asUser", as_user);
        let url =
            c.endpoint_with_query(["execution", id.to_string().as_str(), "abort"], &query)?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["execution", id.to_string().as_str()])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }

    /// Per-id results are returned as the server reports them.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<BulkDeleteExecutionsResponse> {
        if ids.is_empty() {
            return Err(RundeckError::InvalidInput("ids cannot be empty".into()));
        }
        let c = self.client;
        let url = c.endpoint(["executions", "delete"])?;
        let body = c.json_body(&IdList { ids })?;
        let res = c.expect_ok(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }
}
