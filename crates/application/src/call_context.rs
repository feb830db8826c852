//! Per-call context handed explicitly to record builders
//!
//! A `CallContext` carries what the surrounding transport knows about one
//! call: the request line, headers, cookies, form fields and body, and once
//! the handler ran, the response status, headers and cookies.
//!
//! # Examples
//!
//! ```
//! use application::CallContext;
//! use http::{Method, StatusCode};
//!
//! let ctx = CallContext::new(Method::GET, "https://api.example.com/orders?page=2".parse().unwrap())
//!     .with_header("Accept", "application/json")
//!     .with_response_status(StatusCode::OK);
//!
//! assert_eq!(ctx.url_without_query(), "https://api.example.com/orders");
//! assert_eq!(ctx.query_string().as_deref(), Some("page=2"));
//! assert_eq!(ctx.host().as_deref(), Some("api.example.com"));
//! ```

use std::{
    fmt,
    io::{self, Cursor, Read},
    net::IpAddr,
};

use bytes::Bytes;
use domain::{Cookies, FormFields, Headers};
use http::{Method, StatusCode, Uri};

/// Readable request body that can be captured without consuming it
pub struct RequestBody {
    reader: Box<dyn Read + Send + Sync>,
}

impl RequestBody {
    /// A body with no content
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A body over in-memory bytes
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            reader: Box::new(Cursor::new(bytes.into())),
        }
    }

    /// A body over an arbitrary reader
    pub fn from_reader(reader: impl Read + Send + Sync + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Read the whole body and put a fresh reader over the same bytes back
    ///
    /// Whatever was read before a read error is still restored, so the
    /// downstream reader never sees less than the capture did.
    pub fn capture(&mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        let result = self.reader.read_to_end(&mut buf);
        let bytes = Bytes::from(buf);
        self.reader = Box::new(Cursor::new(bytes.clone()));
        result.map(|_| bytes)
    }
}

impl Read for RequestBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody").finish_non_exhaustive()
    }
}

/// Everything known about one call, request and response side
#[derive(Debug)]
pub struct CallContext {
    method: Method,
    uri: Uri,
    remote_addr: Option<IpAddr>,
    request_headers: Headers,
    cookies: Cookies,
    form: FormFields,
    body: RequestBody,
    response_status: Option<StatusCode>,
    response_headers: Headers,
    response_cookies: Cookies,
}

impl CallContext {
    /// Context for a request with no headers, cookies, form or body
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            remote_addr: None,
            request_headers: Headers::new(),
            cookies: Cookies::new(),
            form: FormFields::new(),
            body: RequestBody::empty(),
            response_status: None,
            response_headers: Headers::new(),
            response_cookies: Cookies::new(),
        }
    }

    #[must_use]
    pub const fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.entry(name.into()).or_default().push(value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub const fn with_response_status(mut self, status: StatusCode) -> Self {
        self.response_status = Some(status);
        self
    }

    #[must_use]
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_response_cookie(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_cookies.insert(name.into(), value.into());
        self
    }

    /// Record the response status once the handler has run
    pub const fn set_response_status(&mut self, status: StatusCode) {
        self.response_status = Some(status);
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub const fn remote_addr(&self) -> Option<IpAddr> {
        self.remote_addr
    }

    pub const fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub const fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    pub const fn form(&self) -> &FormFields {
        &self.form
    }

    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    pub const fn body_mut(&mut self) -> &mut RequestBody {
        &mut self.body
    }

    pub const fn response_status(&self) -> Option<StatusCode> {
        self.response_status
    }

    pub const fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    pub const fn response_cookies(&self) -> &Cookies {
        &self.response_cookies
    }

    /// `Host` header if present, otherwise the host of the request uri
    pub fn host(&self) -> Option<String> {
        self.request_headers
            .get("host")
            .map(str::to_string)
            .or_else(|| self.uri.host().map(str::to_string))
    }

    /// Request uri with the query string removed
    pub fn url_without_query(&self) -> String {
        strip_query(&self.uri.to_string()).to_string()
    }

    /// Query string without the leading `?`
    pub fn query_string(&self) -> Option<String> {
        self.uri.query().map(str::to_string)
    }
}

/// Everything before the first `?`
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
