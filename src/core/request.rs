//! Host request abstraction.

use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use percent_encoding::percent_decode_str;

use crate::body::FormBody;

/// What the encoding layer needs from the hosting server's request.
///
/// Hosts that stack request wrappers (forwards, includes) expose the inner
/// request through [`wrapped`](Self::wrapped); query strings are collected
/// along that chain.
pub trait HostRequest {
    /// HTTP method.
    fn method(&self) -> &Method;

    /// Raw, still percent-encoded query string.
    fn query_string(&self) -> Option<&str>;

    /// Content-Type header value.
    fn content_type(&self) -> Option<&str>;

    /// Servlet path as decoded by the host.
    fn servlet_path(&self) -> Option<&str>;

    /// Extra path after the servlet path, as decoded by the host.
    fn path_info(&self) -> Option<&str> {
        None
    }

    /// Path info mapped to a filesystem path, as decoded by the host.
    fn path_translated(&self) -> Option<&str> {
        None
    }

    /// Body read by the integration layer.
    fn form_body(&self) -> &FormBody;

    /// Request this one wraps, if any.
    fn wrapped(&self) -> Option<&dyn HostRequest> {
        None
    }

    /// Parameters the host already decoded as ISO-8859-1.
    fn decoded_parameters(&self) -> Option<&[(String, String)]> {
        None
    }
}

/// Concrete host request built on `http` types.
///
/// Note: Clone is intentionally not derived; wrapped chains can be deep.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: FormBody,
    servlet_path: Option<String>,
    path_info: Option<String>,
    path_translated: Option<String>,
    decoded_parameters: Option<Vec<(String, String)>>,
    wrapped: Option<Box<Request>>,
}

impl Request {
    /// Create a request. The servlet path is derived from the URI the way a
    /// naive host does it: percent-decoded, bytes read as ISO-8859-1.
    #[inline]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: FormBody) -> Self {
        let servlet_path = Some(latin1_decode_path(uri.path()));
        Self {
            method,
            uri,
            headers,
            body,
            servlet_path,
            path_info: None,
            path_translated: None,
            decoded_parameters: None,
            wrapped: None,
        }
    }

    /// Build from a borrowed `http` request, leaving its body in place.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        Self::new(
            req.method().clone(),
            req.uri().clone(),
            req.headers().clone(),
            FormBody::Empty,
        )
    }

    /// Create a request builder.
    #[inline]
    pub fn builder(method: Method, uri: Uri) -> RequestBuilder {
        RequestBuilder::new(method, uri)
    }

    /// Get the full URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Replace the body once the integration layer has read it.
    #[inline]
    pub fn set_form_body(&mut self, body: FormBody) {
        self.body = body;
    }
}

impl HostRequest for Request {
    #[inline]
    fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    #[inline]
    fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    #[inline]
    fn servlet_path(&self) -> Option<&str> {
        self.servlet_path.as_deref()
    }

    #[inline]
    fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    #[inline]
    fn path_translated(&self) -> Option<&str> {
        self.path_translated.as_deref()
    }

    #[inline]
    fn form_body(&self) -> &FormBody {
        &self.body
    }

    fn wrapped(&self) -> Option<&dyn HostRequest> {
        self.wrapped.as_deref().map(|r| r as &dyn HostRequest)
    }

    fn decoded_parameters(&self) -> Option<&[(String, String)]> {
        self.decoded_parameters.as_deref()
    }
}

impl<B> From<http::Request<B>> for Request {
    /// Convert headers and URI; the body must be read separately and
    /// attached with [`Request::set_form_body`].
    fn from(req: http::Request<B>) -> Self {
        let (parts, _body) = req.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, FormBody::Empty)
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    fn new(method: Method, uri: Uri) -> Self {
        Self {
            request: Request::new(method, uri, HeaderMap::new(), FormBody::Empty),
        }
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.request.headers.insert(name, value);
        }
        self
    }

    pub fn body(mut self, body: FormBody) -> Self {
        self.request.body = body;
        self
    }

    /// Override the host-decoded servlet path.
    pub fn servlet_path(mut self, path: impl Into<String>) -> Self {
        self.request.servlet_path = Some(path.into());
        self
    }

    pub fn path_info(mut self, path: impl Into<String>) -> Self {
        self.request.path_info = Some(path.into());
        self
    }

    pub fn path_translated(mut self, path: impl Into<String>) -> Self {
        self.request.path_translated = Some(path.into());
        self
    }

    /// Parameters as the host decoded them (ISO-8859-1).
    pub fn decoded_parameters(mut self, params: Vec<(String, String)>) -> Self {
        self.request.decoded_parameters = Some(params);
        self
    }

    /// Wrap an inner request (e.g. the original request of a forward).
    pub fn wrapping(mut self, inner: Request) -> Self {
        self.request.wrapped = Some(Box::new(inner));
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

/// Percent-decode a path reading every byte as one ISO-8859-1 character.
fn latin1_decode_path(path: &str) -> String {
    percent_decode_str(path).map(char::from).collect()
}
