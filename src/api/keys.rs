use std::fmt;
use std::iter;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::{Client, query};
use crate::error::Result;

/// Kind of secret held in key storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Private,
    Public,
    Password,
}

impl KeyType {
    /// Content type the server expects when uploading this kind of key.
    pub fn content_type(self) -> &'static str {
        match self {
            KeyType::Private => "application/octet-stream",
            KeyType::Public => "application/pgp-keys",
            KeyType::Password => "application/x-rundeck-data-password",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyType::Private => "private",
            KeyType::Public => "public",
            KeyType::Password => "password",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMetadata {
    #[serde(rename = "Rundeck-key-type")]
    pub key_type: Option<KeyType>,
    #[serde(rename = "Rundeck-content-mask")]
    pub content_mask: String,
    #[serde(rename = "Rundeck-content-size", deserialize_with = "size_from_any")]
    pub content_size: u64,
    #[serde(rename = "Rundeck-content-type")]
    pub content_type: String,
}

/// A key file or directory in key storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyResource {
    pub meta: KeyMetadata,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListKeysResponse {
    pub resources: Vec<KeyResource>,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

// The server reports sizes as strings; older versions used numbers.
fn size_from_any<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        Size::Text(s) if s.is_empty() => Ok(0),
        Size::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Key storage endpoints.
///
/// Paths are slash-separated and relative to the key storage root, e.g.
/// `ops`. The `keys/ops` form the server reports in `path` fields is
/// accepted too, so listed resources can be passed straight back.
pub struct KeyStorage<'a> {
    client: &'a Client,
}

impl<'a> KeyStorage<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists the directory at `path`.
    pub async fn list(&self, path: &str) -> Result<ListKeysResponse> {
        let c = self.client;
        let url = c.endpoint_dir(storage_path(path))?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn metadata(&self, path: &str, name: &str) -> Result<KeyResource> {
        let c = self.client;
        let url = c.endpoint(storage_path(path).chain(iter::once(name)))?;
        let res = c.expect_ok(c.get(url).await?).await?;
        c.decode(res).await
    }

    pub async fn create(
        &self,
        path: &str,
        name: &str,
        key_type: KeyType,
        content: Vec<u8>,
    ) -> Result<KeyResource> {
        let c = self.client;
        let url = c.endpoint(storage_path(path).chain(iter::once(name)))?;
        let res = c
            .expect_created(
                c.post_with_headers(url, content_type(key_type), Some(content))
                    .await?,
            )
            .await?;
        c.decode(res).await
    }

    pub async fn update(
        &self,
        path: &str,
        name: &str,
        key_type: KeyType,
        content: Vec<u8>,
    ) -> Result<KeyResource> {
        let c = self.client;
        let url = c.endpoint(storage_path(path).chain(iter::once(name)))?;
        let res = c
            .expect_ok(
                c.put_with_headers(url, content_type(key_type), Some(content))
                    .await?,
            )
            .await?;
        c.decode(res).await
    }

    pub async fn delete(&self, path: &str, name: &str) -> Result<()> {
        let c = self.client;
        let url = c.endpoint(storage_path(path).chain(iter::once(name)))?;
        c.expect_no_content(c.delete(url, None).await?).await
    }
}

fn storage_path(path: &str) -> impl Iterator<Item = &str> {
    let mut segments = query::path_segments(path).peekable();
    segments.next_if_eq(&"keys");
    ["storage", "keys"].into_iter().chain(segments)
}

fn content_type(key_type: KeyType) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(key_type.content_type()));
    headers
}
