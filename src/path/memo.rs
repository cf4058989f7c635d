//! Per-accessor memo of the last corrected path.

use super::EncodingCorrector;

/// Remembers the last `(upstream, encoding) -> corrected` triple for one
/// path-like accessor.
///
/// Hosts may rewrite the path mid-request, so the memo is keyed on both
/// inputs and recomputed whenever either one differs.
#[derive(Debug, Default, Clone)]
pub struct CorrectionMemo {
    upstream: Option<String>,
    encoding: Option<String>,
    corrected: Option<String>,
}

impl CorrectionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corrected form of `upstream`, recomputed only when the inputs changed.
    pub fn get(
        &mut self,
        corrector: &EncodingCorrector,
        upstream: Option<&str>,
        encoding: Option<&str>,
    ) -> Option<&str> {
        let upstream = upstream?;

        if !self.is_cached(upstream, encoding) {
            let corrected = corrector.correct(upstream, encoding).into_owned();
            self.upstream = Some(upstream.to_owned());
            self.encoding = encoding.map(str::to_owned);
            self.corrected = Some(corrected);
        }

        self.corrected.as_deref()
    }

    /// Forget the memoized result.
    pub fn invalidate(&mut self) {
        self.upstream = None;
        self.encoding = None;
        self.corrected = None;
    }

    /// Whether a result for exactly these inputs is held.
    pub fn is_cached(&self, upstream: &str, encoding: Option<&str>) -> bool {
        self.corrected.is_some()
            && self.upstream.as_deref() == Some(upstream)
            && self.encoding.as_deref() == encoding
    }
}
