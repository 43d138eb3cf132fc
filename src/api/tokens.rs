use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::{Result, RundeckError};

/// An API token. `token` is only populated on creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub id: String,
    pub user: String,
    pub token: Option<String>,
    pub creator: String,
    pub expiration: Option<DateTime<Utc>>,
    pub roles: Vec<String>,
    pub expired: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTokenInput {
    pub user: String,
    pub roles: Vec<String>,
    /// Lifetime in the server's duration syntax, e.g. `30d` or `12h`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// API token endpoints.
pub struct Tokens<'a> {
    client: &'a Client,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Token>> {
        let c = self.client;
        let url = c.endpoint(["tokens"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn for_user(&self, user: &str) -> Result<Vec<Token>> {
        let c = self.client;
        let url = c.endpoint(["tokens", user])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn get(&self, id: &str) -> Result<Token> {
        let c = self.client;
        let url = c.endpoint(["token", id])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn create(&self, input: &CreateTokenInput) -> Result<Token> {
        if input.user.is_empty() {
            return Err(RundeckError::InvalidInput("token user cannot be empty".into()));
        }
        let c = self.client;
        let url = c.endpoint(["tokens"])?;
        let body = c.json_body(input)?;
        let res = c.expect_created(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["token", id])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }
}
