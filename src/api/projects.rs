use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::jobs::UuidOption;
use crate::client::{Client, Query, ToQuery, query};
use crate::error::{Result, RundeckError};

const ZIP: &str = "application/zip";

/// Project metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Project metadata together with its configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    #[serde(flatten)]
    pub project: Project,
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProjectInput {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

impl CreateProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfigKeyPair {
    pub key: String,
    pub value: String,
}

/// What a project archive export includes.
#[derive(Debug, Clone, Default)]
pub struct ArchiveExportInput {
    pub execution_ids: Vec<i64>,
    pub export_all: bool,
    pub export_jobs: bool,
    pub export_executions: bool,
    pub export_configs: bool,
    pub export_readmes: bool,
    pub export_acls: bool,
}

impl ToQuery for ArchiveExportInput {
    fn to_query(&self, query: &mut Query) {
        query
            .push_joined("executionIds", &self.execution_ids, ",")
            .push_flag("exportAcls", self.export_acls)
            .push_flag("exportAll", self.export_all)
            .push_flag("exportConfigs", self.export_configs)
            .push_flag("exportExecutions", self.export_executions)
            .push_flag("exportJobs", self.export_jobs)
            .push_flag("exportReadmes", self.export_readmes);
    }
}

/// Progress of an asynchronous archive export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveExportStatus {
    pub token: String,
    pub ready: bool,
    pub percentage: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveImportInput {
    pub job_uuid_option: Option<UuidOption>,
    pub import_executions: bool,
    pub import_config: bool,
    pub import_acl: bool,
}

impl ToQuery for ArchiveImportInput {
    fn to_query(&self, query: &mut Query) {
        query
            .push_opt("jobUuidOption", self.job_uuid_option)
            .push_flag("importACL", self.import_acl)
            .push_flag("importConfig", self.import_config)
            .push_flag("importExecutions", self.import_executions);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Successful,
    #[default]
    Failed,
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImportStatus::Successful => "successful",
            ImportStatus::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveImportResponse {
    pub import_status: ImportStatus,
    pub errors: Vec<String>,
    pub execution_errors: Vec<String>,
    pub acl_errors: Vec<String>,
}

/// A node from a project's resource model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeEntry {
    pub nodename: String,
    pub hostname: String,
    pub username: String,
    pub description: String,
    pub tags: String,
    pub os_family: String,
    pub os_arch: String,
    pub os_name: String,
    pub os_version: String,
    pub edit_url: Option<String>,
    pub remote_url: Option<String>,
    /// Every other node attribute.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Project endpoints.
pub struct Projects<'a> {
    client: &'a Client,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        let c = self.client;
        let url = c.endpoint(["projects"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn create(&self, input: &CreateProjectInput) -> Result<ProjectInfo> {
        if input.name.is_empty() {
            return Err(RundeckError::InvalidInput("project name cannot be empty".into()));
        }
        let c = self.client;
        let url = c.endpoint(["projects"])?;
        let body = c.json_body(input)?;
        let res = c.expect_created(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    pub async fn info(&self, project: &str) -> Result<ProjectInfo> {
        let c = self.client;
        let url = c.endpoint(["project", project])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn delete(&self, project: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["project", project])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }

    pub async fn configuration(&self, project: &str) -> Result<BTreeMap<String, String>> {
        let c = self.client;
        let url = c.endpoint(["project", project, "config"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Replaces the whole project configuration.
    pub async fn configure(
        &self,
        project: &str,
        config: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let c = self.client;
        let url = c.endpoint(["project", project, "config"])?;
        let body = c.json_body(config)?;
        let res = c.expect_ok(c.put(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    pub async fn config_key(&self, project: &str, key: &str) -> Result<ProjectConfigKeyPair> {
        let c = self.client;
        let url = c.endpoint(["project", project, "config", key])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn set_config_key(
        &self,
        project: &str,
        pair: &ProjectConfigKeyPair,
    ) -> Result<ProjectConfigKeyPair> {
        if pair.key.is_empty() {
            return Err(RundeckError::InvalidInput("config key cannot be empty".into()));
        }
        let c = self.client;
        let url = c.endpoint(["project", project, "config", pair.key.as_str()])?;
        let body = c.json_body(pair)?;
        let res = c.expect_ok(c.put(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    pub async fn delete_config_key(&self, project: &str, key: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["project", project, "config", key])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }

    /// Exports the project as a zip archive in one request.
    pub async fn archive_export(
        &self,
        project: &str,
        input: &ArchiveExportInput,
    ) -> Result<Vec<u8>> {
        let c = self.client;
        let url =
            c.endpoint_with_query(["project", project, "export"], &Query::from_options(input))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ZIP));
        let res = c.expect_ok(c.get_with_headers(url, headers).await?).await?;
        c.bytes(res).await
    }

    /// Starts an export and returns the token to poll with.
    pub async fn archive_export_async(
        &self,
        project: &str,
        input: &ArchiveExportInput,
    ) -> Result<ArchiveExportStatus> {
        let c = self.client;
        let url = c.endpoint_with_query(
            ["project", project, "export", "async"],
            &Query::from_options(input),
        )?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn archive_export_status(
        &self,
        project: &str,
        token: &str,
    ) -> Result<ArchiveExportStatus> {
        let c = self.client;
        let url = c.endpoint(["project", project, "export", "status", token])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Downloads a finished asynchronous export.
    ///
    /// Fails with [`RundeckError::ArchiveNotReady`] while the export is
    /// still running.
    pub async fn archive_export_download(&self, project: &str, token: &str) -> Result<Vec<u8>> {
        let status = self.archive_export_status(project, token).await?;
        if !status.ready {
            return Err(RundeckError::ArchiveNotReady {
                percentage: status.percentage,
            });
        }

        let c = self.client;
        let url = c.endpoint(["project", project, "export", "download", token])?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ZIP));
        let res = c.expect_ok(c.get_with_headers(url, headers).await?).await?;
        c.bytes(res).await
    }

    pub async fn archive_import(
        &self,
        project: &str,
        archive: Vec<u8>,
        input: &ArchiveImportInput,
    ) -> Result<ArchiveImportResponse> {
        let c = self.client;
        let url =
            c.endpoint_with_query(["project", project, "import"], &Query::from_options(input))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(ZIP));
        let res = c.expect_ok(c.put_with_headers(url, headers, Some(archive)).await?).await?;
        c.decode(res).await
    }

    /// Nodes of the project, keyed by node name, optionally filtered by
    /// node attributes.
    pub async fn resources(
        &self,
        project: &str,
        filters: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, NodeEntry>> {
        let c = self.client;
        let mut params = Query::new();
        params.push_str("filter", &query::node_filter(filters));
        let url = c.endpoint_with_query(["project", project, "resources"], &params)?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{
        body_bytes, body_json, header, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test_support::client_for;

    #[test]
    fn export_input_sends_only_set_flags() {
        let query = Query::from_options(&ArchiveExportInput {
            execution_ids: vec![3, 5],
            export_jobs: true,
            ..Default::default()
        });
        assert_eq!(query.get("executionIds"), Some("3,5"));
        assert_eq!(query.get("exportJobs"), Some("true"));
        assert_eq!(query.get("exportAll"), None);
        assert_eq!(query.get("exportAcls"), None);

        assert!(Query::from_options(&ArchiveExportInput::default()).is_empty());
    }

    #[test]
    fn import_input_sends_only_set_fields() {
        let query = Query::from_options(&ArchiveImportInput {
            job_uuid_option: Some(UuidOption::Remove),
            import_acl: true,
            ..Default::default()
        });
        assert_eq!(query.get("jobUuidOption"), Some("remove"));
        assert_eq!(query.get("importACL"), Some("true"));
        assert_eq!(query.get("importConfig"), None);
    }

    #[test]
    fn node_entry_keeps_extra_attributes() {
        let node: NodeEntry = serde_json::from_value(json!({
            "nodename": "web-1",
            "hostname": "10.0.0.5",
            "osFamily": "unix",
            "tags": "web,prod",
            "rack": "r12"
        }))
        .unwrap();
        assert_eq!(node.nodename, "web-1");
        assert_eq!(node.os_family, "unix");
        assert_eq!(node.attributes["rack"], "r12");
        assert!(!node.attributes.contains_key("nodename"));
    }

    #[tokio::test]
    async fn list_projects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Test-1", "description": "", "url": "http://localhost:4440/api/24/project/Test-1"},
                {"name": "Test-2", "description": "second", "url": "http://localhost:4440/api/24/project/Test-2"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let projects = client.projects().list().await.unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Test-1", "Test-2"]);
    }

    #[tokio::test]
    async fn create_project_expects_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/projects"))
            .and(body_json(json!({"name": "Test", "description": "my description string"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "Test",
                "description": "my description string",
                "url": "http://localhost:4440/api/24/project/Test",
                "config": {"project.description": "my description string"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client
            .projects()
            .create(&CreateProjectInput {
                description: "my description string".into(),
                ..CreateProjectInput::new("Test")
            })
            .await
            .unwrap();
        assert_eq!(info.project.name, "Test");
        assert_eq!(info.project.description, "my description string");
        assert_eq!(info.config["project.description"], "my description string");
    }

    #[tokio::test]
    async fn create_project_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": true,
                "apiversion": 24,
                "errorCode": "api.error.item.alreadyexists",
                "message": "project already exists: Test"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .projects()
            .create(&CreateProjectInput::new("Test"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn create_project_requires_name() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client
            .projects()
            .create(&CreateProjectInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RundeckError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn info_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Test",
                "description": "",
                "url": "http://localhost:4440/api/24/project/Test",
                "config": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/24/project/Test"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client.projects().info("Test").await.unwrap();
        assert_eq!(info.project.name, "Test");
        assert!(info.config.is_empty());
        client.projects().delete("Test").await.unwrap();
    }

    #[tokio::test]
    async fn configuration_round() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/config"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"project.name": "Test", "a.b": "c"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/24/project/Test/config"))
            .and(body_json(json!({"a.b": "d"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a.b": "d"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let config = client.projects().configuration("Test").await.unwrap();
        assert_eq!(config["a.b"], "c");

        let mut update = BTreeMap::new();
        update.insert("a.b".to_string(), "d".to_string());
        let config = client.projects().configure("Test", &update).await.unwrap();
        assert_eq!(config, update);
    }

    #[tokio::test]
    async fn config_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/config/project.ssh-keypath"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "project.ssh-keypath",
                "value": "/var/lib/rundeck/.ssh/id_rsa"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/24/project/Test/config/custom.key"))
            .and(body_json(json!({"key": "custom.key", "value": "v"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"key": "custom.key", "value": "v"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/24/project/Test/config/custom.key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let pair = client
            .projects()
            .config_key("Test", "project.ssh-keypath")
            .await
            .unwrap();
        assert_eq!(pair.value, "/var/lib/rundeck/.ssh/id_rsa");

        let pair = ProjectConfigKeyPair {
            key: "custom.key".into(),
            value: "v".into(),
        };
        let saved = client.projects().set_config_key("Test", &pair).await.unwrap();
        assert_eq!(saved, pair);

        client
            .projects()
            .delete_config_key("Test", "custom.key")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sync_archive_export() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export"))
            .and(query_param("exportJobs", "true"))
            .and(query_param_is_missing("exportAll"))
            .and(header("Accept", "application/zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04".to_vec()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bytes = client
            .projects()
            .archive_export(
                "Test",
                &ArchiveExportInput {
                    export_jobs: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(bytes, b"PK\x03\x04");
    }

    #[tokio::test]
    async fn async_export_download_waits_for_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export/status/tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-1",
                "ready": false,
                "percentage": 40
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export/download/tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .projects()
            .archive_export_download("Test", "tok-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RundeckError::ArchiveNotReady { percentage: 40 }));
    }

    #[tokio::test]
    async fn async_export_flow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export/async"))
            .and(query_param("exportAll", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-2",
                "ready": false,
                "percentage": 0
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export/status/tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-2",
                "ready": true,
                "percentage": 100
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/export/download/tok-2"))
            .and(header("Accept", "application/zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let started = client
            .projects()
            .archive_export_async(
                "Test",
                &ArchiveExportInput {
                    export_all: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(started.token, "tok-2");

        let bytes = client
            .projects()
            .archive_export_download("Test", &started.token)
            .await
            .unwrap();
        assert_eq!(bytes, b"PK");
    }

    #[tokio::test]
    async fn archive_import_puts_zip() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/24/project/Test/import"))
            .and(header("Content-Type", "application/zip"))
            .and(query_param("jobUuidOption", "preserve"))
            .and(query_param("importConfig", "true"))
            .and(body_bytes(b"PK\x03\x04".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "import_status": "failed",
                "errors": ["Job at index [1] at archive path: ... had errors"],
                "execution_errors": [],
                "acl_errors": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let res = client
            .projects()
            .archive_import(
                "Test",
                b"PK\x03\x04".to_vec(),
                &ArchiveImportInput {
                    job_uuid_option: Some(UuidOption::Preserve),
                    import_config: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(res.import_status, ImportStatus::Failed);
        assert_eq!(res.errors.len(), 1);
    }

    #[tokio::test]
    async fn resources_with_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/resources"))
            .and(query_param("filter", "name: web-1 tags: prod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web-1": {"nodename": "web-1", "hostname": "10.0.0.5", "tags": "prod"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut filters = BTreeMap::new();
        filters.insert("tags".to_string(), "prod".to_string());
        filters.insert("name".to_string(), "web-1".to_string());
        let nodes = client.projects().resources("Test", &filters).await.unwrap();
        assert_eq!(nodes["web-1"].hostname, "10.0.0.5");
    }

    #[tokio::test]
    async fn resources_without_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/Test/resources"))
            .and(query_param_is_missing("filter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let nodes = client
            .projects()
            .resources("Test", &BTreeMap::new())
            .await
            .unwrap();
        assert!(nodes.is_empty());
    }
}
