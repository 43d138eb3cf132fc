use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Active,
    Passive,
}

impl ExecutionMode {
    fn action(self) -> &'static str {
        match self {
            ExecutionMode::Active => "enable",
            ExecutionMode::Passive => "disable",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Active => "active",
            ExecutionMode::Passive => "passive",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionModeStatus {
    pub execution_mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfoResponse {
    pub system: SystemInfo,
}

/// Server build, host and runtime statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemInfo {
    pub timestamp: Timestamp,
    pub rundeck: ServerBuild,
    pub executions: ExecutionsInfo,
    pub os: OperatingSystem,
    pub jvm: Jvm,
    pub stats: Stats,
    pub metrics: Link,
    pub thread_dump: Link,
    #[serde(rename = "healthcheck")]
    pub health_check: Link,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    pub epoch: i64,
    pub unit: String,
    pub datetime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerBuild {
    pub version: String,
    pub build: String,
    pub node: String,
    pub base: String,
    #[serde(rename = "apiversion")]
    pub api_version: u32,
    #[serde(rename = "serverUUID")]
    pub server_uuid: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionsInfo {
    pub active: bool,
    pub execution_mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingSystem {
    pub arch: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Jvm {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub implementation_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub uptime: UptimeStats,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub scheduler: SchedulerStats,
    pub threads: ThreadStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeStats {
    pub duration: i64,
    pub unit: String,
    pub since: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuStats {
    pub load_average: LoadAverage,
    pub processors: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadAverage {
    pub unit: String,
    pub average: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStats {
    pub unit: String,
    pub max: i64,
    pub free: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerStats {
    pub running: u32,
    pub thread_pool_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadStats {
    pub active: u32,
}

/// Pointer to a related server resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Link {
    pub href: String,
    pub content_type: String,
}

pub struct System<'a> {
    client: &'a Client,
}

impl<'a> System<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn info(&self) -> Result<SystemInfoResponse> {
        let c = self.client;
        let url = c.endpoint(["system", "info"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Switches the server between active and passive execution mode.
    pub async fn set_execution_mode(&self, mode: ExecutionMode) -> Result<ExecutionModeStatus> {
        let c = self.client;
        let url = c.endpoint(["system", "executions", mode.action()])?;
        let res = c.expect_ok(c.post(url, None).await?).await?;
        c.decode(res).await
    }
}
