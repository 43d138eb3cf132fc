use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::executions::Execution;
use super::{Paging, PagingInfo};
use crate::client::{Client, Query};
use crate::error::Result;

/// Log storage plugin state and counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogStorageStats {
    pub enabled: bool,
    pub plugin_name: Option<String>,
    pub succeeded_count: i64,
    pub failed_count: i64,
    pub queued_count: i64,
    pub total_count: i64,
    pub incomplete_count: i64,
    pub missing_count: i64,
}

/// Log storage state attached to an execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogStorageMetadata {
    pub local_files_present: bool,
    pub incomplete_filetypes: Option<String>,
    pub queued: bool,
    pub failed: bool,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncompleteLogStorageResponse {
    #[serde(flatten)]
    pub paging: PagingInfo,
    pub executions: Vec<Execution>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumedIncompleteLogStorageResponse {
    pub resumed: bool,
}

/// Log storage endpoints under `/system/logstorage`.
pub struct LogStorage<'a> {
    client: &'a Client,
}

impl<'a> LogStorage<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<LogStorageStats> {
        let c = self.client;
        let url = c.endpoint(["system", "logstorage"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Executions whose logs have not been fully stored.
    pub async fn incomplete(&self, paging: &Paging) -> Result<IncompleteLogStorageResponse> {
        let c = self.client;
        let url = c.endpoint_with_query(
            ["system", "logstorage", "incomplete"],
            &Query::from_options(paging),
        )?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Restarts processing of incomplete uploads.
    pub async fn resume_incomplete(&self) -> Result<ResumedIncompleteLogStorageResponse> {
        let c = self.client;
        let url = c.endpoint(["system", "logstorage", "incomplete", "resume"])?;
        let res = c.expect_ok(c.post(url, None).await?).await?;
        c.decode(res).await
    }
}
