//! Raw HTTP response representation used by the cache-aware fetch path.
//!
//! Live responses and cache hits are both normalized into [`RawResponse`],
//! so callers cannot tell them apart. Cache entries persist the response in
//! plain HTTP/1.1 exchange form (status line, headers, blank line, body)
//! and are parsed back through [`RawResponse::parse`].

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::cache::CacheError;

/// A fully-buffered HTTP response: status, headers and body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Buffers a live reqwest response. The body is read to completion, so
    /// the returned value stays fully readable no matter how often it is
    /// persisted or inspected afterwards.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Serializes the response in HTTP/1.1 exchange form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 256);
        out.extend_from_slice(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or("")
            )
            .as_bytes(),
        );
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_str().as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    /// Parses a serialized response back into the live representation.
    pub fn parse(bytes: &[u8]) -> Result<Self, CacheError> {
        let split = find_header_end(bytes)
            .ok_or_else(|| CacheError::Malformed("missing header terminator".into()))?;
        let (head, body) = (&bytes[..split], &bytes[split + 4..]);

        let head = std::str::from_utf8(head)
            .map_err(|_| CacheError::Malformed("non-utf8 response head".into()))?;
        let mut lines = head.split("\r\n");

        let status_line = lines
            .next()
            .ok_or_else(|| CacheError::Malformed("missing status line".into()))?;
        let code = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| CacheError::Malformed(format!("bad status line: {status_line}")))?;
        let status = StatusCode::from_u16(code)
            .map_err(|_| CacheError::Malformed(format!("bad status code: {code}")))?;

        let mut headers = HeaderMap::new();
        for line in lines.filter(|l| !l.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| CacheError::Malformed(format!("bad header line: {line}")))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| CacheError::Malformed(format!("bad header name: {name}")))?;
            let value = HeaderValue::from_bytes(value.trim().as_bytes())
                .map_err(|_| CacheError::Malformed(format!("bad header value in: {line}")))?;
            headers.append(name, value);
        }

        Ok(Self {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawResponse {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        RawResponse {
            status: StatusCode::OK,
            headers,
            body: br#"{"results":[{"o":1.5E2}]}"#.to_vec(),
        }
    }

    #[test]
    fn serialized_form_round_trips() {
        let original = sample();
        let parsed = RawResponse::parse(&original.to_bytes()).unwrap();
        assert_eq!(parsed.status, original.status);
        assert_eq!(parsed.headers, original.headers);
        assert_eq!(parsed.body, original.body);
    }

    #[test]
    fn body_bytes_survive_verbatim() {
        let mut response = sample();
        response.body = vec![0u8, 159, 146, 150];
        let parsed = RawResponse::parse(&response.to_bytes()).unwrap();
        assert_eq!(parsed.body, response.body);
    }

    #[test]
    fn non_200_status_round_trips() {
        let mut response = sample();
        response.status = StatusCode::TOO_MANY_REQUESTS;
        let parsed = RawResponse::parse(&response.to_bytes()).unwrap();
        assert_eq!(parsed.status.as_u16(), 429);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(RawResponse::parse(b"not an http response").is_err());
        assert!(RawResponse::parse(b"HTTP/1.1 banana OK\r\n\r\n").is_err());
    }
}
