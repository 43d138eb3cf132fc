//! Request decorator that stamps the fixed Rundeck headers onto every call.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue, InvalidHeaderValue};
use reqwest::{Request, Response};

/// Header Rundeck reads the API token from.
pub const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-rundeck-auth-token");

const JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Wraps the HTTP client and injects content negotiation and auth headers.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    token: HeaderValue,
}

impl Transport {
    /// Fails if the token is not a valid header value.
    pub fn new(http: reqwest::Client, token: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            http,
            token: token_header(token)?,
        })
    }

    pub fn set_token(&mut self, token: &str) -> Result<(), InvalidHeaderValue> {
        self.token = token_header(token)?;
        Ok(())
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// JSON Accept/Content-Type unless the caller set them, then the token.
    pub fn decorate(&self, request: &mut Request) {
        let headers = request.headers_mut();
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, JSON);
        }
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, JSON);
        }
        headers.insert(AUTH_TOKEN_HEADER, self.token.clone());
    }

    pub async fn execute(&self, mut request: Request) -> Result<Response, reqwest::Error> {
        self.decorate(&mut request);
        self.http.execute(request).await
    }
}

fn token_header(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(token)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::*;

    fn request(http: &reqwest::Client) -> Request {
        http.request(Method::GET, "http://localhost:4440/api/24/projects")
            .build()
            .unwrap()
    }

    #[test]
    fn adds_json_defaults_and_token() {
        let http = reqwest::Client::new();
        let transport = Transport::new(http.clone(), "tok").unwrap();
        let mut req = request(&http);
        transport.decorate(&mut req);

        let headers = req.headers();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[AUTH_TOKEN_HEADER], "tok");
        assert!(headers[AUTH_TOKEN_HEADER].is_sensitive());
    }

    #[test]
    fn keeps_caller_content_headers() {
        let http = reqwest::Client::new();
        let transport = Transport::new(http.clone(), "tok").unwrap();
        let mut req = http
            .request(Method::PUT, "http://localhost:4440/api/24/system/acl/x.aclpolicy")
            .header(ACCEPT, "text/plain")
            .header(CONTENT_TYPE, "text/plain")
            .build()
            .unwrap();
        transport.decorate(&mut req);

        assert_eq!(req.headers()[ACCEPT], "text/plain");
        assert_eq!(req.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(req.headers().get_all(ACCEPT).iter().count(), 1);
    }

    #[test]
    fn token_replaces_existing_value() {
        let http = reqwest::Client::new();
        let mut transport = Transport::new(http.clone(), "old").unwrap();
        transport.set_token("new").unwrap();

        let mut req = request(&http);
        req.headers_mut()
            .insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("stale"));
        transport.decorate(&mut req);

        let values: Vec<_> = req.headers().get_all(AUTH_TOKEN_HEADER).iter().collect();
        assert_eq!(values, vec!["new"]);
    }

    #[test]
    fn rejects_token_with_newline() {
        assert!(Transport::new(reqwest::Client::new(), "bad\ntoken").is_err());
    }
}
