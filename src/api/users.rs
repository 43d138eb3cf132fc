use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Profile fields to change. Unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyUserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// User profile endpoints. A `None` login targets the token's own user.
pub struct Users<'a> {
    client: &'a Client,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        let c = self.client;
        let url = c.endpoint(["user", "list"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn get(&self, login: Option<&str>) -> Result<UserProfile> {
        let c = self.client;
        let url = c.endpoint(info_path(login))?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn modify(
        &self,
        login: Option<&str>,
        input: &ModifyUserInput,
    ) -> Result<UserProfile> {
        let c = self.client;
        let url = c.endpoint(info_path(login))?;
        let body = c.json_body(input)?;
        let res = c.expect_ok(c.post(url, Some(body)).await?).await?;
        c.decode(res).await
    }
}

fn info_path(login: Option<&str>) -> Vec<&str> {
    let mut segments = vec!["user", "info"];
    segments.extend(login);
    segments
}
