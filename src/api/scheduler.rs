use serde::{Deserialize, Serialize};

use super::jobs::Job;
use crate::client::Client;
use crate::error::{Result, RundeckError};

/// A cluster member, or all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoverServer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeoverJobInput {
    pub id: String,
}

/// Which schedules to claim. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TakeoverScheduleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<TakeoverServer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<TakeoverJobInput>,
}

impl TakeoverScheduleInput {
    /// Claims every schedule owned by the server with `uuid`.
    pub fn server(uuid: impl Into<String>) -> Self {
        Self {
            server: Some(TakeoverServer {
                uuid: uuid.into(),
                all: false,
            }),
            ..Default::default()
        }
    }

    /// Claims schedules from every other cluster member.
    pub fn all_servers() -> Self {
        Self {
            server: Some(TakeoverServer {
                uuid: String::new(),
                all: true,
            }),
            ..Default::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.server.is_none() && self.project.is_none() && self.job.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoverJob {
    pub href: String,
    pub permalink: String,
    pub id: String,
    #[serde(rename = "previous-owner")]
    pub previous_owner: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoverJobs {
    pub failed: Vec<TakeoverJob>,
    pub successful: Vec<TakeoverJob>,
    pub total: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoverSchedule {
    pub jobs: TakeoverJobs,
    pub server: TakeoverServer,
    pub project: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalServer {
    pub server: TakeoverServer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TakeoverScheduleResponse {
    pub takeover_schedule: TakeoverSchedule,
    /// The server that performed the takeover.
    #[serde(rename = "self")]
    pub local: LocalServer,
    pub message: String,
    #[serde(rename = "apiversion")]
    pub api_version: u32,
    pub success: bool,
}

/// Cluster-mode schedule ownership endpoints.
pub struct ClusterScheduler<'a> {
    client: &'a Client,
}

impl<'a> ClusterScheduler<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn takeover(
        &self,
        input: &TakeoverScheduleInput,
    ) -> Result<TakeoverScheduleResponse> {
        if input.is_empty() {
            return Err(RundeckError::InvalidInput(
                "takeover needs a server, project or job".into(),
            ));
        }
        let c = self.client;
        let url = c.endpoint(["scheduler", "takeover"])?;
        let body = c.json_body(input)?;
        let res = c.expect_ok(c.put(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    /// Jobs whose schedule is owned by the server `uuid`, or by the server
    /// answering the request when `None`.
    pub async fn scheduled_jobs(&self, uuid: Option<&str>) -> Result<Vec<Job>> {
        let c = self.client;
        let url = match uuid {
            Some(uuid) => c.endpoint(["scheduler", "server", uuid, "jobs"])?,
            None => c.endpoint(["scheduler", "jobs"])?,
        };
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }
}
