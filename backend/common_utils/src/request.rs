use error_stack::ResultExt;
use hyperswitch_masking::Maskable;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};

pub type Headers = std::collections::HashSet<(String, Maskable<String>)>;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

fn default_request_headers() -> [(String, Maskable<String>); 1] {
    use http::header;

    [(header::ACCEPT.to_string(), "application/json".to_string().into())]
}

/// Body of an outbound call. Form values keep their masking so that logs never carry secrets.
#[derive(Clone)]
pub enum RequestContent {
    Json(serde_json::Value),
    FormUrlEncoded(Vec<(String, Maskable<String>)>),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
        })
    }
}

impl RequestContent {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::FormUrlEncoded(_) => "application/x-www-form-urlencoded",
        }
    }

    /// Bytes exactly as they go on the wire, secrets exposed.
    pub fn get_body_bytes(&self) -> CustomResult<Vec<u8>, ParsingError> {
        match self {
            Self::Json(value) => serde_json::to_vec(value)
                .change_context(ParsingError::EncodeError("json")),
            Self::FormUrlEncoded(pairs) => {
                let exposed = pairs
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.clone().into_inner()))
                    .collect::<Vec<_>>();
                serde_urlencoded::to_string(exposed)
                    .map(String::into_bytes)
                    .change_context(ParsingError::EncodeError("x-www-form-urlencoded"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: std::collections::HashSet::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn attach_default_headers(mut self) -> Self {
        self.headers.extend(default_request_headers());
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.insert((header.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, Maskable<String>)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn set_body<T: Into<RequestContent>>(mut self, body: T) -> Self {
        self.body.replace(body.into());
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use hyperswitch_masking::{Mask, Secret};

    use super::*;

    #[test]
    fn test_form_body_exposes_masked_values_on_the_wire() {
        let body = RequestContent::FormUrlEncoded(vec![
            ("grant_type".to_string(), "password".to_string().into()),
            (
                "password".to_string(),
                Secret::new("p@ss word".to_string()).into_masked(),
            ),
        ]);
        assert_eq!(
            String::from_utf8(body.get_body_bytes().unwrap()).unwrap(),
            "grant_type=password&password=p%40ss+word"
        );
        assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_builder_collects_headers() {
        let request = RequestBuilder::new()
            .method(Method::Patch)
            .url("https://sandbox.example.com/api/subscriptions/1")
            .attach_default_headers()
            .header("X-Request-Id", "abc")
            .build();
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.headers.len(), 2);
        assert!(request.body.is_none());
    }
}
