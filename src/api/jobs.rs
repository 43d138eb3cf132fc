use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::executions::{Execution, ExecutionList, ExecutionStatus};
use super::{IdList, Paging};
use crate::client::{Client, Query, ToQuery};
use crate::error::{Result, RundeckError};

/// A job definition as listed by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    /// Milliseconds.
    pub average_duration: Option<i64>,
    pub name: String,
    pub group: Option<String>,
    pub project: String,
    pub description: String,
    pub href: String,
    pub permalink: String,
    pub options: BTreeMap<String, String>,
    pub scheduled: Option<bool>,
    pub schedule_enabled: Option<bool>,
    pub enabled: Option<bool>,
    #[serde(rename = "serverNodeUUID")]
    pub server_node_uuid: Option<String>,
    pub server_owner: Option<bool>,
}

/// What `/job/{id}/info` returns; the same shape as a listed job.
pub type JobMetadata = Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Verbose,
    Info,
    Warn,
    Error,
}

/// Serialization format of job definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobFormat {
    Xml,
    #[default]
    Yaml,
}

impl JobFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFormat::Xml => "xml",
            JobFormat::Yaml => "yaml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            JobFormat::Xml => "application/xml",
            JobFormat::Yaml => "application/yaml",
        }
    }
}

impl fmt::Display for JobFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when an imported job already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateOption {
    Skip,
    Create,
    Update,
}

impl fmt::Display for DuplicateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DuplicateOption::Skip => "skip",
            DuplicateOption::Create => "create",
            DuplicateOption::Update => "update",
        })
    }
}

/// Whether imported job UUIDs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UuidOption {
    Preserve,
    Remove,
}

impl fmt::Display for UuidOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UuidOption::Preserve => "preserve",
            UuidOption::Remove => "remove",
        })
    }
}

/// Which switch of a job [`Jobs::toggle`] flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleKind {
    Execution,
    Schedule,
}

impl ToggleKind {
    fn as_str(&self) -> &'static str {
        match self {
            ToggleKind::Execution => "execution",
            ToggleKind::Schedule => "schedule",
        }
    }
}

/// Filters for listing or exporting a project's jobs.
#[derive(Debug, Clone, Default)]
pub struct JobListOptions {
    pub ids: Vec<String>,
    pub group_path: String,
    pub job_filter: String,
    pub job_exact_filter: String,
    pub group_path_exact: String,
    pub scheduled: Option<bool>,
    pub server_node_uuid: String,
}

impl ToQuery for JobListOptions {
    fn to_query(&self, query: &mut Query) {
        query
            .push_joined("idlist", &self.ids, ",")
            .push_str("groupPath", &self.group_path)
            .push_str("jobFilter", &self.job_filter)
            .push_str("jobExactFilter", &self.job_exact_filter)
            .push_str("groupPathExact", &self.group_path_exact)
            .push_opt("scheduledFilter", self.scheduled)
            .push_str("serverNodeUUIDFilter", &self.server_node_uuid);
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobImportOptions {
    pub format: JobFormat,
    pub duplicate: Option<DuplicateOption>,
    pub uuid: Option<UuidOption>,
}

impl ToQuery for JobImportOptions {
    fn to_query(&self, query: &mut Query) {
        query
            .push("fileformat", self.format)
            .push_opt("dupeOption", self.duplicate)
            .push_opt("uuidOption", self.uuid);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobImportResponse {
    pub succeeded: Vec<JobImportResult>,
    pub failed: Vec<JobImportResult>,
    pub skipped: Vec<JobImportResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobImportResult {
    pub index: u32,
    pub id: Option<String>,
    pub name: String,
    pub group: Option<String>,
    pub project: String,
    pub href: Option<String>,
    pub permalink: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJobInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_string: Option<String>,
    #[serde(rename = "loglevel", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_user: Option<String>,
    /// Node filter overriding the job's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkDeleteJobsResponse {
    pub request_count: u64,
    #[serde(rename = "allsuccessful")]
    pub all_successful: bool,
    pub succeeded: Vec<BulkDeleteJobResult>,
    pub failed: Vec<BulkDeleteJobResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkDeleteJobResult {
    pub id: String,
    pub error_code: Option<String>,
    pub message: Option<String>,
}

/// Job endpoints.
pub struct Jobs<'a> {
    client: &'a Client,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, project: &str, options: &JobListOptions) -> Result<Vec<Job>> {
        let c = self.client;
        let url =
            c.endpoint_with_query(["project", project, "jobs"], &Query::from_options(options))?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn info(&self, id: &str) -> Result<JobMetadata> {
        let c = self.client;
        let url = c.endpoint(["job", id, "info"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// The job definition document in the requested format.
    pub async fn definition(&self, id: &str, format: JobFormat) -> Result<Vec<u8>> {
        let c = self.client;
        let mut query = Query::new();
        query.push("format", format);
        let url = c.endpoint_with_query(["job", id], &query)?;
        let res = c.get_with_headers(url, accept(format)).await?;
        let res = c.expect_ok(res).await?;
        c.bytes(res).await
    }

    /// Definitions of all matching jobs in one document.
    pub async fn export(
        &self,
        project: &str,
        format: JobFormat,
        options: &JobListOptions,
    ) -> Result<Vec<u8>> {
        let c = self.client;
        let mut query = Query::new();
        query.push("format", format);
        options.to_query(&mut query);
        let url = c.endpoint_with_query(["project", project, "jobs", "export"], &query)?;
        let res = c.get_with_headers(url, accept(format)).await?;
        let res = c.expect_ok(res).await?;
        c.bytes(res).await
    }

    pub async fn import(
        &self,
        project: &str,
        definitions: Vec<u8>,
        options: &JobImportOptions,
    ) -> Result<JobImportResponse> {
        let c = self.client;
        let url = c.endpoint_with_query(
            ["project", project, "jobs", "import"],
            &Query::from_options(options),
        )?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(options.format.mime_type()));
        let res = c.post_with_headers(url, headers, Some(definitions)).await?;
        let res = c.expect_ok(res).await?;
        c.decode(res).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["job", id])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }

    /// Per-job results are returned as the server reports them.
    pub async fn bulk_delete(&self, ids: &[&str]) -> Result<BulkDeleteJobsResponse> {
        if ids.is_empty() {
            return Err(RundeckError::InvalidInput("ids cannot be empty".into()));
        }
        let c = self.client;
        let url = c.endpoint(["jobs", "delete"])?;
        let body = c.json_body(&IdList { ids })?;
        let res = c.expect_ok(c.delete(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    pub async fn run(&self, id: &str, input: &RunJobInput) -> Result<Execution> {
        let c = self.client;
        let url = c.endpoint(["job", id, "run"])?;
        let body = c.json_body(input)?;
        let res = c.expect_ok(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    /// Enables or disables executions or the schedule of a job.
    pub async fn toggle(
        &self,
        id: &str,
        kind: ToggleKind,
        enabled: bool,
    ) -> Result<ToggleResponse> {
        let c = self.client;
        let action = if enabled { "enable" } else { "disable" };
        let url = c.endpoint(["job", id, kind.as_str(), action])?;
        let res = c.expect_ok(c.post(url, None).await?).await?;
        c.decode(res).await
    }

    pub async fn executions(
        &self,
        id: &str,
        status: Option<ExecutionStatus>,
        paging: &Paging,
    ) -> Result<ExecutionList> {
        let c = self.client;
        let mut query = Query::new();
        query.push_opt("status", status);
        paging.to_query(&mut query);
        let url = c.endpoint_with_query(["job", id, "executions"], &query)?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }
}

fn accept(format: JobFormat) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(format.mime_type()));
    headers
}
