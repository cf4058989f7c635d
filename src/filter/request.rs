//! Per-request wrapper applying the filter's charset.

use tracing::debug;

use super::EncodingFilter;
use crate::body::{self, FormBody};
use crate::charset::{self, CharsetHandle};
use crate::core::{Error, HostRequest};
use crate::params::{ParameterMap, Parameters};
use crate::path::CorrectionMemo;

/// Host request seen through the configured character encoding.
///
/// Parameters are parsed once, on first access. Path accessors are
/// corrected on every call, memoized per accessor.
#[derive(Debug)]
pub struct EncodingRequest<'f, R> {
    filter: &'f EncodingFilter,
    inner: R,
    character_encoding: String,
    params: Parameters,
    parsed: bool,
    servlet_path: CorrectionMemo,
    path_info: CorrectionMemo,
    path_translated: CorrectionMemo,
}

impl<'f, R: HostRequest> EncodingRequest<'f, R> {
    pub(super) fn new(filter: &'f EncodingFilter, inner: R) -> Self {
        Self {
            filter,
            inner,
            character_encoding: filter.config().character_encoding.clone(),
            params: Parameters::new(),
            parsed: false,
            servlet_path: CorrectionMemo::new(),
            path_info: CorrectionMemo::new(),
            path_translated: CorrectionMemo::new(),
        }
    }

    #[inline]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    #[inline]
    pub fn character_encoding(&self) -> &str {
        &self.character_encoding
    }

    /// Change the request charset. Unknown names are accepted and resolve to
    /// UTF-8 when used. Parameters already parsed are not re-parsed.
    pub fn set_character_encoding(&mut self, encoding: impl Into<String>) {
        self.character_encoding = encoding.into();
        self.servlet_path.invalidate();
        self.path_info.invalidate();
        self.path_translated.invalidate();
    }

    /// First value of `name`.
    pub fn parameter(&mut self, name: &str) -> Option<&str> {
        self.parse_parameters().get(name)
    }

    /// All values of `name`, in request order.
    pub fn parameter_values(&mut self, name: &str) -> Option<&[String]> {
        self.parse_parameters().get_all(name)
    }

    /// Parameter names in first-seen order.
    pub fn parameter_names(&mut self) -> Vec<&str> {
        self.parse_parameters().names().collect()
    }

    pub fn parameter_map(&mut self) -> &ParameterMap {
        self.parse_parameters()
    }

    /// Whether any parameter was dropped while parsing.
    pub fn parse_failed(&mut self) -> bool {
        self.parse_parameters();
        self.params.parse_failed()
    }

    pub fn servlet_path(&mut self) -> Option<&str> {
        self.servlet_path.get(
            self.filter.corrector(),
            self.inner.servlet_path(),
            Some(self.character_encoding.as_str()),
        )
    }

    pub fn path_info(&mut self) -> Option<&str> {
        self.path_info.get(
            self.filter.corrector(),
            self.inner.path_info(),
            Some(self.character_encoding.as_str()),
        )
    }

    pub fn path_translated(&mut self) -> Option<&str> {
        self.path_translated.get(
            self.filter.corrector(),
            self.inner.path_translated(),
            Some(self.character_encoding.as_str()),
        )
    }

    /// Reset parsed state so the wrapper can serve the request again.
    pub fn recycle(&mut self) {
        self.params.recycle();
        self.parsed = false;
        self.character_encoding = self.filter.config().character_encoding.clone();
        self.servlet_path.invalidate();
        self.path_info.invalidate();
        self.path_translated.invalidate();
    }

    fn parse_parameters(&mut self) -> &ParameterMap {
        if !self.parsed {
            self.parsed = true;
            self.do_parse();
        }
        self.params.map()
    }

    fn do_parse(&mut self) {
        let config = self.filter.config();
        let params = &mut self.params;

        params.set_limit(config.max_parameter_count);
        params.set_encoding(Some(self.character_encoding.as_str()));
        params.set_query_string_encoding(Some(self.character_encoding.as_str()));

        if config.reparse_host_parameters {
            if let Some(pairs) = self.inner.decoded_parameters() {
                // Unknown names leave the host's values as they are.
                let target = charset::resolve_or(
                    Some(self.character_encoding.as_str()),
                    CharsetHandle::ISO_8859_1,
                );
                params.import_decoded(pairs, target);
                return;
            }
        }

        for query in collect_query_strings(&self.inner) {
            params.handle_query_string(query);
        }

        if !self.filter.is_parse_body_method(self.inner.method()) {
            return;
        }
        let is_form = self
            .inner
            .content_type()
            .map(body::is_form_urlencoded)
            .unwrap_or(false);
        if !is_form {
            return;
        }

        match self.inner.form_body() {
            FormBody::Empty => {}
            FormBody::Data(bytes) => {
                let mut buf = bytes.to_vec();
                params.process_body(&mut buf);
            }
            FormBody::Rejected(e) => {
                debug!(error = %Error::Body(e.clone()), "form body not parsed");
                params.mark_parse_failed();
            }
        }
    }
}

/// Distinct non-empty query strings along the wrapper chain, innermost
/// (original) request first.
fn collect_query_strings(request: &dyn HostRequest) -> Vec<&str> {
    let mut queries = Vec::new();
    let mut current = Some(request);
    while let Some(req) = current {
        if let Some(query) = req.query_string().filter(|q| !q.is_empty()) {
            if !queries.contains(&query) {
                queries.push(query);
            }
        }
        current = req.wrapped();
    }
    queries.reverse();
    queries
}
