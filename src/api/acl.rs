use std::borrow::Cow;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

const POLICY_SUFFIX: &str = ".aclpolicy";
const TEXT_PLAIN: &str = "text/plain";

/// One entry of the system ACL directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AclResource {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub href: String,
}

/// The system ACL directory listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AclList {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub href: String,
    pub resources: Vec<AclResource>,
}

/// System ACL policy endpoints. Policy names may be given with or without
/// the `.aclpolicy` suffix.
pub struct Acl<'a> {
    client: &'a Client,
}

impl<'a> Acl<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<AclList> {
        let c = self.client;
        let url = c.endpoint_dir(["system", "acl"])?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    /// Raw policy document.
    pub async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let c = self.client;
        let url = c.endpoint(["system", "acl", policy_file(name).as_ref()])?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(TEXT_PLAIN));
        let res = c.expect_ok(c.get_with_headers(url, headers).await?).await?;
        c.bytes(res).await
    }

    pub async fn create(&self, name: &str, policy: Vec<u8>) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["system", "acl", policy_file(name).as_ref()])?;
        c.expect_created(c.post_with_headers(url, text_body(), Some(policy)).await?)
            .await?;
        Ok(())
    }

    pub async fn update(&self, name: &str, policy: Vec<u8>) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["system", "acl", policy_file(name).as_ref()])?;
        c.expect_ok(c.put_with_headers(url, text_body(), Some(policy)).await?)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(["system", "acl", policy_file(name).as_ref()])?;
        c.expect_no_content(c.delete(url, None).await?).await
    }
}

fn policy_file(name: &str) -> Cow<'_, str> {
    if name.ends_with(POLICY_SUFFIX) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}{POLICY_SUFFIX}"))
    }
}

fn text_body() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    headers
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test_support::client_for;

    const POLICY: &str = "description: Admin project level access control.
context:
  project: '.*'
for:
  resource:
    - allow: '*'
by:
  group: admin
";

    #[test]
    fn suffix_is_added_once() {
        assert_eq!(policy_file("admin"), "admin.aclpolicy");
        assert_eq!(policy_file("admin.aclpolicy"), "admin.aclpolicy");
    }

    #[tokio::test]
    async fn list_uses_trailing_slash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/system/acl/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "path": "",
                "type": "directory",
                "href": "http://server/api/24/system/acl/",
                "resources": [{
                    "path": "admin.aclpolicy",
                    "type": "file",
                    "name": "admin.aclpolicy",
                    "href": "http://server/api/24/system/acl/admin.aclpolicy"
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let list = client.acl().list().await.unwrap();
        assert_eq!(list.kind, "directory");
        assert_eq!(list.resources.len(), 1);
        assert_eq!(list.resources[0].name, "admin.aclpolicy");
        assert_eq!(list.resources[0].kind, "file");
    }

    #[tokio::test]
    async fn get_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/system/acl/admin.aclpolicy"))
            .and(header("Accept", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string(POLICY))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client.acl().get("admin").await.unwrap();
        assert_eq!(body, POLICY.as_bytes());
    }

    #[tokio::test]
    async fn create_and_update_send_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/system/acl/ops.aclpolicy"))
            .and(header("Content-Type", "text/plain"))
            .and(body_bytes(POLICY.as_bytes().to_vec()))
            .respond_with(ResponseTemplate::new(201).set_body_string(POLICY))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/24/system/acl/ops.aclpolicy"))
            .and(header("Content-Type", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string(POLICY))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .acl()
            .create("ops", POLICY.as_bytes().to_vec())
            .await
            .unwrap();
        client
            .acl()
            .update("ops.aclpolicy", POLICY.as_bytes().to_vec())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_policy_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/system/acl/bad.aclpolicy"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "valid": false,
                "policies": [{"policy": "file1.aclpolicy[1]", "errors": ["Section 'for:' cannot be empty"]}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .acl()
            .create("bad", b"for: {}".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.api_error().unwrap().message, "400 Bad Request");
    }

    #[tokio::test]
    async fn delete_appends_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/24/system/acl/ops.aclpolicy"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.acl().delete("ops").await.unwrap();
    }
}
