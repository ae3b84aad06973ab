//! Assertions on a received HTTP response.

use std::fmt;
use std::rc::Rc;

use elenchus_core::{AssertionFailure, Chain, FailureKind, RequestSnapshot, ResponseSnapshot};
use http::{header, StatusCode};
use serde_json::{Map, Value as Json};

use crate::error::ExpectError;
use crate::op::{check, derive};
use crate::{Object, StringValue, Value, Wrapper};

/// A class of HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRange {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
}

impl StatusRange {
    /// Returns the range a status code belongs to.
    #[must_use]
    pub fn of(status: StatusCode) -> Option<Self> {
        match status.as_u16() {
            100..=199 => Some(Self::Informational),
            200..=299 => Some(Self::Success),
            300..=399 => Some(Self::Redirect),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "1xx Informational",
            Self::Success => "2xx Success",
            Self::Redirect => "3xx Redirect",
            Self::ClientError => "4xx Client Error",
            Self::ServerError => "5xx Server Error",
        }
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A received HTTP response with its body fully read.
///
/// The response (and the request, if given) is attached to the chain so
/// failure reports can print it.
///
/// # Example
///
/// ```
/// use elenchus_assert::Response;
/// use elenchus_core::fixtures::recording_chain;
/// use elenchus_core::ResponseSnapshot;
/// use http::{header, HeaderMap, HeaderValue, StatusCode};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
/// let snapshot = ResponseSnapshot::new(StatusCode::OK, headers, r#"{"id":1}"#);
///
/// let (root, handler) = recording_chain();
/// let response = Response::new(&root, snapshot);
/// response.status(StatusCode::OK);
/// response.json().object().value("id").is_equal(&1);
///
/// assert_eq!(handler.failure_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    chain: Chain,
    response: Rc<ResponseSnapshot>,
}

impl Response {
    /// Wraps an already-read response.
    pub fn new(parent: &Chain, response: ResponseSnapshot) -> Self {
        Self::build(parent, None, response)
    }

    /// Wraps an already-read response together with the request that
    /// produced it.
    pub fn with_request(
        parent: &Chain,
        request: RequestSnapshot,
        response: ResponseSnapshot,
    ) -> Self {
        Self::build(parent, Some(request), response)
    }

    /// Reads the body of `response` and wraps it.
    pub async fn from_http<B>(
        parent: &Chain,
        response: http::Response<B>,
    ) -> Result<Self, ExpectError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ExpectError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(
            parent,
            ResponseSnapshot::new(parts.status, parts.headers, body),
        ))
    }

    fn build(parent: &Chain, request: Option<RequestSnapshot>, response: ResponseSnapshot) -> Self {
        let response = Rc::new(response);
        derive(parent, "Response()", |op| {
            if let Some(request) = request {
                op.set_request(Rc::new(request));
            }
            op.set_response(Rc::clone(&response));
            Self {
                chain: op.fork(),
                response,
            }
        })
    }

    /// Returns the response snapshot.
    #[must_use]
    pub fn raw(&self) -> &ResponseSnapshot {
        &self.response
    }

    /// Sets the name this response is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Asserts the status code equals `expected`.
    pub fn status(&self, expected: StatusCode) -> &Self {
        check(&self.chain, format!("Status({})", expected.as_u16()), |op| {
            if self.response.status != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.response.status.to_string())
                        .expected(expected.to_string())
                        .error("expected: http status codes are equal"),
                );
            }
        });
        self
    }

    /// Asserts the status code belongs to `range`.
    pub fn status_range(&self, range: StatusRange) -> &Self {
        check(&self.chain, format!("StatusRange({range})"), |op| {
            if StatusRange::of(self.response.status) != Some(range) {
                op.fail(
                    AssertionFailure::new(FailureKind::Belongs)
                        .actual(self.response.status.to_string())
                        .expected_list(vec![Json::from(range.to_string())])
                        .error("expected: http status belongs to range"),
                );
            }
        });
        self
    }

    /// Returns the value of header `name`.
    ///
    /// Multiple values are joined with `", "`.
    pub fn header(&self, name: &str) -> StringValue {
        derive(&self.chain, format!("Header({name:?})"), |op| {
            let value = self.header_value(name);
            if value.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsKey)
                        .actual(Json::Object(self.header_map()))
                        .expected(name)
                        .error("expected: response contains header"),
                );
            }
            StringValue::from_parts(op.fork(), value.unwrap_or_default())
        })
    }

    /// Returns all headers as an object keyed by lowercase header name.
    pub fn headers(&self) -> Object {
        derive(&self.chain, "Headers()", |op| {
            Object::from_parts(op.fork(), self.header_map())
        })
    }

    /// Asserts the media type (and, if given, charset) of the body.
    pub fn content_type(&self, media_type: &str, charset: Option<&str>) -> &Self {
        check(&self.chain, format!("ContentType({media_type:?})"), |op| {
            self.check_content_type(op, |actual| actual == media_type, media_type, charset);
        });
        self
    }

    /// Returns the body as a string, without checking the content type.
    pub fn body(&self) -> StringValue {
        derive(&self.chain, "Body()", |op| {
            let text = self.body_text(op);
            StringValue::from_parts(op.fork(), text)
        })
    }

    /// Returns the body as a string after checking it is `text/plain`.
    pub fn text(&self) -> StringValue {
        derive(&self.chain, "Text()", |op| {
            if !op.is_skipped() {
                self.check_content_type(op, |actual| actual == "text/plain", "text/plain", None);
            }
            let text = self.body_text(op);
            StringValue::from_parts(op.fork(), text)
        })
    }

    /// Parses the body as JSON after checking the content type is JSON.
    ///
    /// `application/json` and any `+json` media type are accepted, with no
    /// charset or `utf-8`.
    pub fn json(&self) -> Value {
        derive(&self.chain, "JSON()", |op| {
            if op.is_skipped() {
                return Value::from_parts(op.fork(), Json::Null);
            }
            self.check_content_type(op, is_json_media_type, "application/json", None);
            if op.failed() {
                return Value::from_parts(op.fork(), Json::Null);
            }

            let value = match serde_json::from_slice::<Json>(&self.response.body) {
                Ok(value) => value,
                Err(err) => {
                    op.fail(
                        AssertionFailure::new(FailureKind::Valid)
                            .actual(self.response.text().unwrap_or("<binary body>"))
                            .error("expected: response body can be decoded as JSON")
                            .error(err.to_string()),
                    );
                    Json::Null
                }
            };
            let value = elenchus_core::canonical::canonical_value(op, &value).unwrap_or(Json::Null);
            Value::from_parts(op.fork(), value)
        })
    }

    fn header_value(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .response
            .headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().unwrap_or("<binary>"))
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    fn header_map(&self) -> Map<String, Json> {
        self.response
            .headers
            .keys()
            .filter_map(|name| {
                self.header_value(name.as_str())
                    .map(|value| (name.as_str().to_string(), Json::String(value)))
            })
            .collect()
    }

    fn body_text(&self, op: &Chain) -> String {
        match self.response.text() {
            Some(text) => text.to_string(),
            None => {
                if !op.is_skipped() {
                    op.fail(
                        AssertionFailure::new(FailureKind::Valid)
                            .error("expected: response body is valid UTF-8"),
                    );
                }
                String::from_utf8_lossy(&self.response.body).into_owned()
            }
        }
    }

    fn check_content_type(
        &self,
        op: &Chain,
        accepts: impl Fn(&str) -> bool,
        expected: &str,
        charset: Option<&str>,
    ) {
        let Some(content_type) = self.header_value(header::CONTENT_TYPE.as_str()) else {
            op.fail(
                AssertionFailure::new(FailureKind::NotEmpty)
                    .error(format!("expected: Content-Type header with {expected:?} media type")),
            );
            return;
        };

        let (media_type, params) = parse_content_type(&content_type);
        if !accepts(&media_type) {
            op.fail(
                AssertionFailure::new(FailureKind::Equal)
                    .actual(media_type)
                    .expected(expected)
                    .error("expected: Content-Type header has expected media type"),
            );
            return;
        }

        let actual_charset = params
            .iter()
            .find(|(key, _)| key == "charset")
            .map(|(_, value)| value.to_ascii_lowercase());
        let charset_ok = match (charset, actual_charset.as_deref()) {
            (Some(expected), actual) => actual == Some(expected.to_ascii_lowercase().as_str()),
            (None, None | Some("utf-8")) => true,
            (None, Some(_)) => false,
        };
        if !charset_ok {
            op.fail(
                AssertionFailure::new(FailureKind::Equal)
                    .actual(actual_charset.unwrap_or_default())
                    .expected(charset.unwrap_or("utf-8"))
                    .error("expected: Content-Type header has expected charset"),
            );
        }
    }
}

impl Wrapper for Response {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        serde_json::json!({
            "status": self.response.status.as_u16(),
            "headers": self.header_map(),
            "body": String::from_utf8_lossy(&self.response.body),
        })
    }
}

fn is_json_media_type(media_type: &str) -> bool {
    media_type == "application/json" || media_type.ends_with("+json")
}

/// Splits `type/subtype; key=value` into a lowercase media type and
/// parameters.
fn parse_content_type(value: &str) -> (String, Vec<(String, String)>) {
    let mut parts = value.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let params = parts
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            Some((
                key.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_string(),
            ))
        })
        .collect();
    (media_type, params)
}
