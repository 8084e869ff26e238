//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing per RFC 7233. Multi-range requests and
//! non-byte units are ignored rather than rejected, which makes the server
//! answer them with the full body.

/// A parsed byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position
    pub start: usize,
    /// Last byte position, None for an open-ended range
    pub end: Option<usize>,
}

impl ByteRange {
    /// Actual last byte position given the file size
    #[inline]
    pub fn end_position(&self, file_size: usize) -> usize {
        self.end.unwrap_or_else(|| file_size.saturating_sub(1))
    }
}

/// Outcome of parsing a Range header against a known file size
#[derive(Debug)]
pub enum RangeParseResult {
    /// Satisfiable range, serve 206
    Valid(ByteRange),
    /// Range lies outside the file, serve 416
    NotSatisfiable,
    /// No Range header, or one we ignore; serve the full body
    None,
}

/// Parse a Range header value
///
/// Accepted forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };
    let Some(ranges) = header.strip_prefix("bytes=") else {
        return RangeParseResult::None;
    };
    // Single range only
    if ranges.contains(',') {
        return RangeParseResult::None;
    }
    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        // Suffix form: last N bytes
        let Ok(suffix) = end_str.parse::<usize>() else {
            return RangeParseResult::None;
        };
        if suffix == 0 || file_size == 0 {
            return RangeParseResult::NotSatisfiable;
        }
        return RangeParseResult::Valid(ByteRange {
            start: file_size.saturating_sub(suffix),
            end: Some(file_size - 1),
        });
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<usize>() {
            // Clamp to the last byte of the file
            Ok(e) => Some(e.min(file_size - 1)),
            Err(_) => return RangeParseResult::None,
        }
    };

    if matches!(end, Some(e) if start > e) {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}
