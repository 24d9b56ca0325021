//! Request metadata consumed by validation and URI generation.

use alloc::{borrow::ToOwned, string::String, vec::Vec};

/// The parts of an HTTP request this crate reads.
///
/// Implement this for the request type of a server framework, or use
/// [`CgiRequest`].
pub trait RequestContext {
    /// Returns the request method, e.g., `"GET"`.
    fn request_method(&self) -> &str;

    /// Returns the escaped query component of the request URI, without `'?'`.
    fn query_string(&self) -> &str;

    /// Returns the request body.
    fn body(&self) -> &[u8];

    /// Returns the URI scheme the request was made with.
    fn scheme(&self) -> &str;

    /// Returns the server name.
    fn server_name(&self) -> &str;

    /// Returns the server port.
    fn server_port(&self) -> u16;

    /// Returns the unescaped path of the running script.
    fn script_name(&self) -> &str;

    /// Returns the unescaped path info following the script path.
    fn path_info(&self) -> &str;
}

/// A request described by CGI meta-variables.
///
/// # Examples
///
/// ```
/// use webform::request::{CgiRequest, RequestContext};
///
/// let vars = [
///     ("REQUEST_METHOD", "GET"),
///     ("SERVER_NAME", "example.com"),
///     ("SERVER_PORT", "8080"),
///     ("SCRIPT_NAME", "/app.cgi"),
///     ("QUERY_STRING", "q=1"),
/// ];
/// let req = CgiRequest::from_vars(
///     |name| vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string()),
///     Vec::new(),
/// );
///
/// assert_eq!(req.scheme(), "http");
/// assert_eq!(req.server_port(), 8080);
/// assert_eq!(req.path_info(), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CgiRequest {
    request_method: String,
    query_string: String,
    body: Vec<u8>,
    scheme: String,
    server_name: String,
    server_port: u16,
    script_name: String,
    path_info: String,
}

impl CgiRequest {
    /// Creates a `GET` request to `http://localhost/` with no query and no body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_method: "GET".to_owned(),
            scheme: "http".to_owned(),
            server_name: "localhost".to_owned(),
            server_port: 80,
            ..Self::default()
        }
    }

    /// Creates a request from meta-variables looked up by name.
    ///
    /// `HTTPS` set to `on` or `1` selects the `https` scheme. A missing or
    /// malformed `SERVER_PORT` falls back to the default port of the scheme.
    pub fn from_vars<F>(mut var: F, body: Vec<u8>) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let https = var("HTTPS")
            .map_or(false, |v| v.eq_ignore_ascii_case("on") || v == "1");
        let (scheme, default_port) = if https { ("https", 443) } else { ("http", 80) };
        let server_port = var("SERVER_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_port);

        let req = Self {
            request_method: var("REQUEST_METHOD").unwrap_or_else(|| "GET".to_owned()),
            query_string: var("QUERY_STRING").unwrap_or_default(),
            body,
            scheme: scheme.to_owned(),
            server_name: var("SERVER_NAME").unwrap_or_else(|| "localhost".to_owned()),
            server_port,
            script_name: var("SCRIPT_NAME").unwrap_or_default(),
            path_info: var("PATH_INFO").unwrap_or_default(),
        };
        tracing::debug!(
            "Read CGI request {} {}{}",
            req.request_method,
            req.script_name,
            req.path_info
        );
        req
    }

    /// Creates a request from the meta-variables in the process environment.
    #[cfg(feature = "std")]
    pub fn from_env(body: Vec<u8>) -> Self {
        Self::from_vars(|name| std::env::var(name).ok(), body)
    }

    /// Sets the request method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.request_method = method.into();
        self
    }

    /// Sets the escaped query string.
    #[must_use]
    pub fn with_query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the script path and path info.
    #[must_use]
    pub fn with_location(
        mut self,
        script_name: impl Into<String>,
        path_info: impl Into<String>,
    ) -> Self {
        self.script_name = script_name.into();
        self.path_info = path_info.into();
        self
    }
}

impl RequestContext for CgiRequest {
    fn request_method(&self) -> &str {
        &self.request_method
    }

    fn query_string(&self) -> &str {
        &self.query_string
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn server_name(&self) -> &str {
        &self.server_name
    }

    fn server_port(&self) -> u16 {
        self.server_port
    }

    fn script_name(&self) -> &str {
        &self.script_name
    }

    fn path_info(&self) -> &str {
        &self.path_info
    }
}
