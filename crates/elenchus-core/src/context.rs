//! Assertion context types.
//!
//! The [`AssertionContext`] is what the reporting sink sees alongside a
//! failure: where in the chain the check happened and which HTTP exchange it
//! belongs to.

use std::rc::Rc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};

use crate::environment::Environment;

/// An already-sent HTTP request, kept for failure reports.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// Request method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl RequestSnapshot {
    /// Creates a snapshot with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Returns a snapshot with the given headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns a snapshot with the given body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// A received HTTP response with its body fully read.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl ResponseSnapshot {
    /// Creates a snapshot from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the body as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Where a check happened, handed to the reporting sink.
#[derive(Debug, Clone, Default)]
pub struct AssertionContext {
    /// Name of the test the chain belongs to.
    pub test_name: String,
    /// Path segments from the root to the chain.
    pub path: Vec<String>,
    /// Path segments with aliases applied.
    pub aliased_path: Vec<String>,
    /// The request, if one was attached.
    pub request: Option<Rc<RequestSnapshot>>,
    /// The response, if one was attached.
    pub response: Option<Rc<ResponseSnapshot>>,
    /// The environment, if one was attached.
    pub environment: Option<Environment>,
}

impl AssertionContext {
    /// Renders the real path.
    #[must_use]
    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }

    /// Renders the aliased path.
    #[must_use]
    pub fn aliased_path_string(&self) -> String {
        render_path(&self.aliased_path)
    }
}

/// Joins path segments with `.`, attaching `[..]` segments directly.
#[must_use]
pub fn render_path(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        if !out.is_empty() && !segment.starts_with('[') {
            out.push('.');
        }
        out.push_str(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_render_path() {
        assert_eq!(render_path(&[]), "");
        assert_eq!(render_path(&segments(&["Foo", "Bar"])), "Foo.Bar");
        assert_eq!(
            render_path(&segments(&["Array()", "Filter()", "[2]", "IsEqual()"])),
            "Array().Filter()[2].IsEqual()"
        );
    }

    #[test]
    fn test_context_path_strings() {
        let ctx = AssertionContext {
            path: segments(&["Response()", "JSON()"]),
            aliased_path: segments(&["user", "JSON()"]),
            ..Default::default()
        };
        assert_eq!(ctx.path_string(), "Response().JSON()");
        assert_eq!(ctx.aliased_path_string(), "user.JSON()");
    }

    #[test]
    fn test_response_snapshot_text() {
        let response = ResponseSnapshot::new(StatusCode::OK, HeaderMap::new(), "hello");
        assert_eq!(response.text(), Some("hello"));

        let binary = ResponseSnapshot::new(StatusCode::OK, HeaderMap::new(), vec![0xff, 0xfe]);
        assert_eq!(binary.text(), None);
    }

    #[test]
    fn test_request_snapshot_builder() {
        let request = RequestSnapshot::new(Method::POST, Uri::from_static("/users"))
            .with_body("{}");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Bytes::from_static(b"{}"));
    }
}
