//! Rendering of assertion results.
//!
//! A [`Formatter`] turns an [`AssertionContext`] and an optional
//! [`AssertionFailure`] into the message handed to a reporter or logger.

use std::fmt::Write as _;

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{AssertionContext, RequestSnapshot, ResponseSnapshot};
use crate::failure::{AssertionFailure, Expected, Severity};

/// Output format of the default formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Multi-line human-readable text.
    #[default]
    Text,
    /// A pretty-printed JSON document.
    Json,
}

/// Options for [`DefaultFormatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    /// Output format.
    pub format: ReportFormat,
    /// Include the chain path in messages.
    pub print_paths: bool,
    /// Prefer the aliased path over the real path.
    pub use_aliases: bool,
    /// Include the attached request in failure messages.
    pub print_request: bool,
    /// Include the attached response in failure messages.
    pub print_response: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            print_paths: true,
            use_aliases: true,
            print_request: false,
            print_response: false,
        }
    }
}

/// Renders assertion results into messages.
pub trait Formatter {
    /// Renders a successful check.
    fn format_success(&self, ctx: &AssertionContext) -> String;

    /// Renders a failed check.
    fn format_failure(&self, ctx: &AssertionContext, failure: &AssertionFailure) -> String;
}

/// The built-in formatter.
#[derive(Debug, Clone, Default)]
pub struct DefaultFormatter {
    options: FormatterOptions,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    test: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a AssertionFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
}

impl DefaultFormatter {
    /// Creates a formatter with the given options.
    #[must_use]
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    /// Returns the formatter options.
    #[must_use]
    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    fn path(&self, ctx: &AssertionContext) -> Option<String> {
        if !self.options.print_paths {
            return None;
        }
        let path = if self.options.use_aliases {
            ctx.aliased_path_string()
        } else {
            ctx.path_string()
        };
        (!path.is_empty()).then_some(path)
    }

    fn json_report(
        &self,
        ctx: &AssertionContext,
        failure: Option<&AssertionFailure>,
    ) -> String {
        let report = JsonReport {
            test: (!ctx.test_name.is_empty()).then_some(ctx.test_name.as_str()),
            path: self.path(ctx),
            outcome: if failure.is_some() { "failed" } else { "passed" },
            severity: failure.map(AssertionFailure::effective_severity),
            failure,
            request: failure
                .and(ctx.request.as_deref())
                .filter(|_| self.options.print_request)
                .map(request_json),
            response: failure
                .and(ctx.response.as_deref())
                .filter(|_| self.options.print_response)
                .map(response_json),
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }

    fn text_failure(&self, ctx: &AssertionContext, failure: &AssertionFailure) -> String {
        let mut out = String::new();

        match self.path(ctx) {
            Some(path) => {
                let _ = writeln!(out, "assertion failed: {path}");
            }
            None => out.push_str("assertion failed\n"),
        }
        if !ctx.test_name.is_empty() {
            let _ = writeln!(out, "test: {}", ctx.test_name);
        }

        out.push_str("\nerrors:\n");
        for error in &failure.errors {
            let _ = writeln!(out, "  {error}");
        }

        match &failure.expected {
            Some(Expected::Value { value }) => section(&mut out, "expected value", value),
            Some(Expected::Range { min, max }) => {
                let _ = write!(
                    out,
                    "\nexpected range:\n  [{}; {}]\n",
                    compact(min),
                    compact(max)
                );
            }
            Some(Expected::List { values }) => {
                section(&mut out, "expected list", &Value::Array(values.clone()));
            }
            None => {}
        }
        if let Some(actual) = &failure.actual {
            section(&mut out, "actual value", actual);
        }
        if let Some(reference) = &failure.reference {
            section(&mut out, "reference value", reference);
        }
        if let Some(delta) = failure.delta {
            let _ = write!(out, "\nallowed delta:\n  {delta}\n");
        }

        if self.options.print_request {
            if let Some(request) = &ctx.request {
                out.push_str("\nrequest:\n");
                out.push_str(&indent(&request_text(request)));
            }
        }
        if self.options.print_response {
            if let Some(response) = &ctx.response {
                out.push_str("\nresponse:\n");
                out.push_str(&indent(&response_text(response)));
            }
        }

        out
    }
}

impl Formatter for DefaultFormatter {
    fn format_success(&self, ctx: &AssertionContext) -> String {
        match self.options.format {
            ReportFormat::Json => self.json_report(ctx, None),
            ReportFormat::Text => match self.path(ctx) {
                Some(path) => format!("assertion passed: {path}"),
                None => "assertion passed".to_string(),
            },
        }
    }

    fn format_failure(&self, ctx: &AssertionContext, failure: &AssertionFailure) -> String {
        match self.options.format {
            ReportFormat::Json => self.json_report(ctx, Some(failure)),
            ReportFormat::Text => self.text_failure(ctx, failure),
        }
    }
}

fn section(out: &mut String, title: &str, value: &Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let _ = write!(out, "\n{title}:\n{}", indent(&pretty));
}

fn compact(value: &Value) -> String {
    value.to_string()
}

fn indent(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

fn headers_text(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let _ = writeln!(out, "{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
}

fn body_text(body: &[u8]) -> Option<&str> {
    if body.is_empty() {
        return None;
    }
    Some(std::str::from_utf8(body).unwrap_or("<binary body>"))
}

fn request_text(request: &RequestSnapshot) -> String {
    let mut out = format!("{} {}\n", request.method, request.uri);
    headers_text(&mut out, &request.headers);
    if let Some(body) = body_text(&request.body) {
        let _ = write!(out, "\n{body}\n");
    }
    out
}

fn response_text(response: &ResponseSnapshot) -> String {
    let mut out = format!("{}\n", response.status);
    headers_text(&mut out, &response.headers);
    if let Some(body) = body_text(&response.body) {
        let _ = write!(out, "\n{body}\n");
    }
    out
}

fn headers_json(headers: &HeaderMap) -> Value {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or("<binary>").to_string()),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn request_json(request: &RequestSnapshot) -> Value {
    serde_json::json!({
        "method": request.method.as_str(),
        "uri": request.uri.to_string(),
        "headers": headers_json(&request.headers),
        "body": body_text(&request.body),
    })
}

fn response_json(response: &ResponseSnapshot) -> Value {
    serde_json::json!({
        "status": response.status.as_u16(),
        "headers": headers_json(&response.headers),
        "body": body_text(&response.body),
    })
}
