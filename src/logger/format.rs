//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format, the default)
//! - `common` (Common Log Format)
//! - `json` (one JSON object per line)
//!
//! Unknown format names fall back to `combined`.

use chrono::Local;

/// Everything about one handled request that the access log can render
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string without the leading ?
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Handling time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// New entry stamped with the current local time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Render the entry in the named format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// `METHOD /path?query HTTP/version`
    fn request_line(&self) -> String {
        let query = self
            .query
            .as_ref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        format!(
            "{} {}{} HTTP/{}",
            self.method, self.path, query, self.http_version
        )
    }

    /// Common Log Format:
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// Combined format: common plus referer and user agent
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// One JSON object per line, built by hand to keep serde out of the hot path
    fn format_json(&self) -> String {
        format!(
            r#"{{"remote_addr":"{}","time":"{}","method":"{}","path":"{}","query":{},"http_version":"{}","status":{},"body_bytes":{},"referer":{},"user_agent":{},"request_time_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.method),
            escape_json(&self.path),
            optional_json(self.query.as_deref()),
            escape_json(&self.http_version),
            self.status,
            self.body_bytes,
            optional_json(self.referer.as_deref()),
            optional_json(self.user_agent.as_deref()),
            self.request_time_us,
        )
    }
}

/// Render an optional string as a JSON string or null
fn optional_json(value: Option<&str>) -> String {
    value.map_or_else(
        || "null".to_string(),
        |v| format!("\"{}\"", escape_json(v)),
    )
}

/// Escape special characters for a JSON string
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.0.0.7".to_string(),
            "GET".to_string(),
            "/dashboard".to_string(),
        );
        entry.query = Some("tab=wallets".to_string());
        entry.status = 200;
        entry.body_bytes = 512;
        entry.referer = Some("https://example.com".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 900;
        entry
    }

    #[test]
    fn test_format_combined() {
        let log = sample_entry().format("combined");
        assert!(log.contains("10.0.0.7"));
        assert!(log.contains("GET /dashboard?tab=wallets HTTP/1.1"));
        assert!(log.contains("200 512"));
        assert!(log.contains("https://example.com"));
        assert!(log.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_format_common_omits_headers() {
        let log = sample_entry().format("common");
        assert!(log.contains("GET /dashboard?tab=wallets HTTP/1.1"));
        assert!(!log.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_format_json() {
        let log = sample_entry().format("json");
        assert!(log.contains(r#""remote_addr":"10.0.0.7""#));
        assert!(log.contains(r#""status":200"#));
        assert!(log.contains(r#""body_bytes":512"#));
        assert!(log.contains(r#""query":"tab=wallets""#));
    }

    #[test]
    fn test_json_null_fields() {
        let entry = AccessLogEntry::new("127.0.0.1".to_string(), "GET".to_string(), "/".to_string());
        let log = entry.format("json");
        assert!(log.contains(r#""referer":null"#));
        assert!(log.contains(r#""user_agent":null"#));
    }

    #[test]
    fn test_unknown_format_falls_back_to_combined() {
        let entry = sample_entry();
        assert_eq!(entry.format("whatever"), entry.format("combined"));
    }
}
