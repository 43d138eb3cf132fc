//! Resource wrappers, one per REST resource. Each borrows the [`Client`](crate::Client).

pub mod acl;
pub mod adhoc;
pub mod executions;
pub mod jobs;
pub mod keys;
pub mod logstorage;
pub mod projects;
pub mod scheduler;
pub mod system;
pub mod tokens;
pub mod users;

use serde::{Deserialize, Serialize};

use crate::client::{Query, ToQuery};

pub use acl::{Acl, AclList, AclResource};
pub use adhoc::{
    Adhoc, AdhocCommandInput, AdhocOptions, AdhocResponse, AdhocScriptInput, AdhocScriptOptions,
    AdhocUrlInput,
};
pub use executions::{
    AbortResponse, BulkDeleteExecutionsResponse, Execution, ExecutionList, ExecutionQuery,
    ExecutionStatus, ExecutionTimestamp, ExecutionType, Executions,
};
pub use jobs::{
    BulkDeleteJobsResponse, DuplicateOption, Job, JobFormat, JobImportOptions, JobImportResponse,
    JobListOptions, JobMetadata, Jobs, LogLevel, RunJobInput, ToggleKind, ToggleResponse,
    UuidOption,
};
pub use keys::{KeyMetadata, KeyResource, KeyStorage, KeyType, ListKeysResponse};
pub use logstorage::{
    IncompleteLogStorageResponse, LogStorage, LogStorageMetadata, LogStorageStats,
    ResumedIncompleteLogStorageResponse,
};
pub use projects::{
    ArchiveExportInput, ArchiveExportStatus, ArchiveImportInput, ArchiveImportResponse,
    CreateProjectInput, ImportStatus, NodeEntry, Project, ProjectConfigKeyPair, ProjectInfo,
    Projects,
};
pub use scheduler::{
    ClusterScheduler, TakeoverJob, TakeoverJobInput, TakeoverJobs, TakeoverSchedule,
    TakeoverScheduleInput, TakeoverScheduleResponse, TakeoverServer,
};
pub use system::{ExecutionMode, ExecutionModeStatus, System, SystemInfo, SystemInfoResponse};
pub use tokens::{CreateTokenInput, Token, Tokens};
pub use users::{ModifyUserInput, UserProfile, Users};

/// Paging metadata on list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingInfo {
    pub count: u64,
    pub total: u64,
    pub max: u64,
    pub offset: u64,
}

/// `max`/`offset` request parameters. Zero means "server default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub max: u64,
    pub offset: u64,
}

impl Paging {
    pub fn new(max: u64, offset: u64) -> Self {
        Self { max, offset }
    }
}

impl ToQuery for Paging {
    fn to_query(&self, query: &mut Query) {
        query.push_nonzero("max", self.max).push_nonzero("offset", self.offset);
    }
}

/// `{"ids": [...]}` body shared by the bulk delete endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct IdList<'a, T: Serialize> {
    pub ids: &'a [T],
}
