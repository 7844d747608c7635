//! Request description types.
//!
//! API methods describe a call as an [`ApiRequest`]; the transport turns it
//! into an HTTP request against whichever host is ranked first.

use crate::host::CallType;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Characters that stay unescaped inside a path segment.
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode one path segment such as an index name or objectID.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_SET).to_string()
}

/// Per-call overrides merged into a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers.
    pub headers: HashMap<String, String>,
    /// Extra query parameters.
    pub query: Vec<(String, String)>,
    /// Extra top-level body fields.
    pub body: Map<String, Value>,
    /// Base timeout for this call, replacing the read/write default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Add a top-level body field.
    #[must_use]
    pub fn with_body_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.body.insert(name.into(), value);
        self
    }

    /// Override the base timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully described API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path, already encoded, starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Whether the call goes to read or write hosts.
    pub call_type: CallType,
    /// Extra headers.
    pub headers: HashMap<String, String>,
    /// Base timeout override.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request routed to read hosts.
    pub fn read(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, CallType::Read)
    }

    /// Create a request routed to write hosts.
    pub fn write(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, CallType::Write)
    }

    fn new(method: Method, path: impl Into<String>, call_type: CallType) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            call_type,
            headers: HashMap::new(),
            timeout: None,
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter when a value is present.
    #[must_use]
    pub fn with_opt_query<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with_query(name, v),
            None => self,
        }
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Merge per-call options into the request.
    ///
    /// Extra body fields only apply to object bodies; a missing body
    /// becomes an object holding just those fields.
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.headers.extend(options.headers);
        self.query.extend(options.query);
        if options.timeout.is_some() {
            self.timeout = options.timeout;
        }

        if !options.body.is_empty() {
            match &mut self.body {
                Some(Value::Object(map)) => map.extend(options.body),
                None => self.body = Some(Value::Object(options.body)),
                Some(_) => {
                    tracing::warn!(path = %self.path, "Ignoring body options on a non-object body");
                }
            }
        }

        self
    }

    /// Key identifying this request in a response cache.
    pub fn cache_key(&self) -> String {
        let query: Vec<String> = self.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let body = self.body.as_ref().map(Value::to_string).unwrap_or_default();
        format!("{} {}?{} {}", self.method, self.path, query.join("&"), body)
    }
}
