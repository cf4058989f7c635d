//! Mutable byte window.

/// A view over a mutable byte buffer.
///
/// Invariant: `0 <= start <= end <= capacity`. Decoding may move `end`
/// backwards as escapes collapse; bytes past `end` are left as garbage.
#[derive(Debug)]
pub struct ByteWindow<'a> {
    buf: &'a mut [u8],
    start: usize,
    end: usize,
}

impl<'a> ByteWindow<'a> {
    /// Window over the whole buffer.
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        let end = buf.len();
        Self { buf, start: 0, end }
    }

    /// Window over `start..end`, clamped to the buffer.
    #[inline]
    pub fn with_range(buf: &'a mut [u8], start: usize, end: usize) -> Self {
        let end = end.min(buf.len());
        let start = start.min(end);
        Self { buf, start, end }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Size of the underlying buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Bytes currently inside the window.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// The whole underlying buffer, for in-place rewriting.
    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        self.buf
    }

    /// Shrink the window. `end` must stay within `start..=self.end`.
    #[inline]
    pub(crate) fn truncate(&mut self, end: usize) {
        debug_assert!(end >= self.start && end <= self.end);
        self.end = end.clamp(self.start, self.end);
    }
}
