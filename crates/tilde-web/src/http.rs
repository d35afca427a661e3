//! Minimal HTTP/1.1 request parsing and response writing.
//!
//! Enough of HTTP for the console routes: request line + headers in,
//! status line + Content-Length-framed body out. Connections are
//! one-request, `Connection: close`.

use std::io::{BufRead, Read, Write};

use tilde_types::error::{Result, TildeError};

/// Maximum length of the request line.
const MAX_REQUEST_LINE: usize = 8 * 1024;

/// Maximum number of request headers read before giving up.
const MAX_HEADERS: usize = 100;

/// A parsed inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method, uppercase (e.g. "GET").
    pub method: String,
    /// Percent-decoded request path, query string removed.
    pub path: String,
    /// Decoded query parameters in order of appearance.
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Read and parse one request from the stream.
    ///
    /// Headers are consumed and discarded; the console routes carry all
    /// their inputs in the query string.
    pub fn parse(reader: &mut dyn BufRead) -> Result<Request> {
        let mut line = String::new();
        (&mut *reader)
            .take(MAX_REQUEST_LINE as u64)
            .read_line(&mut line)?;
        let mut parts = line.split_whitespace();
        let (Some(method), Some(target), Some(version)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TildeError::Remote(format!(
                "malformed request line: {:?}",
                line.trim_end()
            )));
        };
        if !version.starts_with("HTTP/") {
            return Err(TildeError::Remote(format!(
                "unsupported protocol: {version}"
            )));
        }

        let (raw_path, raw_query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        let path = percent_decode(raw_path, false);
        let query = raw_query.map(parse_query).unwrap_or_default();

        // Drain headers up to the blank line.
        for _ in 0..MAX_HEADERS {
            let mut header = String::new();
            let n = reader.read_line(&mut header)?;
            if n == 0 || header.trim_end().is_empty() {
                break;
            }
        }

        Ok(Request {
            method: method.to_ascii_uppercase(),
            path,
            query,
        })
    }

    /// The first value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An outbound response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Status reason phrase.
    pub reason: String,
    /// Content-Type header value.
    pub content_type: &'static str,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// 200 OK with a plain-text body.
    pub fn ok_text(body: &str) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            content_type: "text/plain; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }

    /// 200 OK with arbitrary bytes.
    pub fn ok_bytes(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            content_type,
            body,
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(description: &str) -> Self {
        Self {
            status: 400,
            reason: "Bad Request".to_string(),
            content_type: "text/plain; charset=utf-8",
            body: description.as_bytes().to_vec(),
        }
    }

    /// 404 Not Found for an unrouted path.
    pub fn not_found(path: &str) -> Self {
        Self {
            status: 404,
            reason: "Not Found".to_string(),
            content_type: "text/plain; charset=utf-8",
            body: format!("no route for: {path}").into_bytes(),
        }
    }

    /// 500 Internal Server Error carrying the failure description.
    pub fn internal_error(description: &str) -> Self {
        Self {
            status: 500,
            reason: "Internal Server Error".to_string(),
            content_type: "text/plain; charset=utf-8",
            body: description.as_bytes().to_vec(),
        }
    }

    /// Serialize to the wire. `head_only` suppresses the body (HEAD).
    pub fn write_to(&self, writer: &mut dyn Write, head_only: bool) -> std::io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason,
            self.content_type,
            self.body.len()
        )?;
        if !head_only {
            writer.write_all(&self.body)?;
        }
        writer.flush()
    }
}

/// Parse `a=1&b=two` into decoded pairs. `+` decodes to a space.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k, true), percent_decode(v, true)),
            None => (percent_decode(pair, true), String::new()),
        })
        .collect()
}

/// Decode %XX escapes; in query components `+` also becomes a space.
///
/// A `%` not followed by two hex digits passes through literally. Decoding
/// works on raw bytes so multi-byte characters near an escape never trip a
/// char boundary.
fn percent_decode(input: &str, plus_as_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    },
                    _ => {
                        out.push(b'%');
                        i += 1;
                    },
                }
            },
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            },
            b => {
                out.push(b);
                i += 1;
            },
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Escape text for safe embedding in an HTML context.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &str) -> Result<Request> {
        Request::parse(&mut Cursor::new(raw.as_bytes()))
    }

    #[test]
    fn parses_request_line_and_query() {
        let req = parse("GET /console/run?command=echo+hi HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/console/run");
        assert_eq!(req.query_param("command"), Some("echo hi"));
    }

    #[test]
    fn parses_percent_escapes() {
        let req = parse("GET /console/run?command=say%20%22hi%22 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.query_param("command"), Some("say \"hi\""));
    }

    #[test]
    fn path_without_query_has_no_params() {
        let req = parse("GET /console/out HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/console/out");
        assert!(req.query.is_empty());
        assert_eq!(req.query_param("command"), None);
    }

    #[test]
    fn method_is_uppercased() {
        let req = parse("head / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method, "HEAD");
    }

    #[test]
    fn malformed_request_line_fails() {
        assert!(parse("GARBAGE\r\n\r\n").is_err());
        assert!(parse("\r\n").is_err());
    }

    #[test]
    fn non_http_protocol_fails() {
        assert!(parse("GET / SPDY/3\r\n\r\n").is_err());
    }

    #[test]
    fn bare_query_key_gets_empty_value() {
        let req = parse("GET /x?flag&k=v HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.query_param("flag"), Some(""));
        assert_eq!(req.query_param("k"), Some("v"));
    }

    #[test]
    fn invalid_percent_escape_passes_through() {
        assert_eq!(percent_decode("100%zz", false), "100%zz");
        assert_eq!(percent_decode("trailing%", false), "trailing%");
    }

    #[test]
    fn broken_escape_before_multibyte_char_is_literal() {
        // One hex digit, then a two-byte character: no escape to decode.
        assert_eq!(percent_decode("%a\u{e9}", false), "%a\u{e9}");
        assert_eq!(percent_decode("%\u{e9}x", true), "%\u{e9}x");
    }

    #[test]
    fn multibyte_near_escape_parses_without_panicking() {
        let req = parse("GET /%a\u{e9} HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/%a\u{e9}");

        let req = parse("GET /console/run?command=%a\u{e9} HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.query_param("command"), Some("%a\u{e9}"));
    }

    #[test]
    fn response_writes_status_and_body() {
        let mut out = Vec::new();
        Response::ok_text("hello").write_to(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn head_response_omits_body() {
        let mut out = Vec::new();
        Response::ok_text("hello").write_to(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn error_responses_carry_descriptions() {
        let nf = Response::not_found("/missing");
        assert_eq!(nf.status, 404);
        assert!(String::from_utf8(nf.body).unwrap().contains("/missing"));

        let ie = Response::internal_error("handler exploded");
        assert_eq!(ie.status, 500);
        assert!(String::from_utf8(ie.body).unwrap().contains("handler exploded"));
    }

    #[test]
    fn html_escape_covers_specials() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }
}
