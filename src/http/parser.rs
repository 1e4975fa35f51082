use crate::http::request::{Method, Request};
use std::collections::HashMap;
use url::form_urlencoded;

#[derive(Debug)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    Incomplete,
}

/// Parses one HTTP/1.1 request from the front of `buf`.
///
/// Returns the request plus the number of bytes consumed, or
/// `ParseError::Incomplete` when more data is needed. Query-string and
/// URL-encoded body parameters are percent-decoded on the raw bytes and
/// merged into one map, body values winning over query values.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {

    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest);
    let mut parts = request_line?.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Path and query string
    let mut params = HashMap::new();
    let path = match target.split_once('?') {
        Some((path, query)) => {
            decode_params(query.as_bytes(), &mut params);
            path
        }
        None => target,
    };

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        headers.insert(
           key.trim().to_ascii_lowercase(),
           value.trim().to_string(),
        );
    }

    // Cookies
    let cookies = headers
        .get("cookie")
        .map(|v| parse_cookies(v))
        .unwrap_or_default();

    // Body
    let content_length = headers
        .get("content-length")
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    // URL-encoded form bodies share the parameter namespace with the
    // query string; decoded last so body values win.
    if method == Method::POST && is_form_urlencoded(&headers) {
        decode_params(&body, &mut params);
    }

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        params,
        cookies,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))

}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}

/// Decodes `key=value&key=value` pairs, percent-decoding keys and values
/// on the raw bytes so multi-byte UTF-8 escapes reassemble correctly.
/// Last value wins on duplicate keys.
fn decode_params(input: &[u8], params: &mut HashMap<String, String>) {
    for (key, value) in form_urlencoded::parse(input) {
        params.insert(key.into_owned(), value.into_owned());
    }
}

fn is_form_urlencoded(headers: &HashMap<String, String>) -> bool {
    headers
        .get("content-type")
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}
