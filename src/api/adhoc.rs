use serde::{Deserialize, Serialize};

use super::executions::Execution;
use crate::client::Client;
use crate::error::{Result, RundeckError};

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Settings shared by every adhoc run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocOptions {
    pub project: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub node_threadcount: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub node_keepgoing: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub as_user: String,
    /// Node filter expression, e.g. `tags: web`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
}

impl AdhocOptions {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }
}

/// How a script is invoked on the nodes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocScriptOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arg_string: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script_interpreter: String,
    #[serde(skip_serializing_if = "is_false")]
    pub interpreter_args_quoted: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_extension: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdhocCommandInput {
    pub exec: String,
    #[serde(flatten)]
    pub options: AdhocOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdhocScriptInput {
    /// Script body.
    pub script: String,
    #[serde(flatten)]
    pub options: AdhocOptions,
    #[serde(flatten)]
    pub script_options: AdhocScriptOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdhocUrlInput {
    /// Where the nodes download the script from.
    pub url: String,
    #[serde(flatten)]
    pub options: AdhocOptions,
    #[serde(flatten)]
    pub script_options: AdhocScriptOptions,
}

/// The started execution. Only `id`, `href` and `permalink` are filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdhocResponse {
    pub message: String,
    pub execution: Execution,
}

/// Runs commands and scripts on a project's nodes without a saved job.
pub struct Adhoc<'a> {
    client: &'a Client,
}

impl<'a> Adhoc<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn run_command(&self, input: &AdhocCommandInput) -> Result<AdhocResponse> {
        require(&input.options.project, "project")?;
        require(&input.exec, "exec")?;
        self.run(&input.options.project, "command", input).await
    }

    pub async fn run_script(&self, input: &AdhocScriptInput) -> Result<AdhocResponse> {
        require(&input.options.project, "project")?;
        require(&input.script, "script")?;
        self.run(&input.options.project, "script", input).await
    }

    pub async fn run_url(&self, input: &AdhocUrlInput) -> Result<AdhocResponse> {
        require(&input.options.project, "project")?;
        require(&input.url, "url")?;
        self.run(&input.options.project, "url", input).await
    }

    async fn run<B: Serialize>(
        &self,
        project: &str,
        kind: &str,
        input: &B,
    ) -> Result<AdhocResponse> {
        let c = self.client;
        let url = c.endpoint(["project", project, "run", kind])?;
        let body = c.json_body(input)?;
        let res = c.expect_ok(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RundeckError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}
