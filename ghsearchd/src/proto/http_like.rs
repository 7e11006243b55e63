use anyhow::Result;
use ghsearch_api::{limits, status::StatusCode};
use memchr::{memchr, memmem::Finder};
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: "GET".into(), path: path.into(), headers: vec![], body: vec![] }
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, q)| q)
    }

    /// Decoded `key=value` pairs of the query string, in order.
    /// `+` decodes to a space, as in HTML form encoding.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = self.query() else { return Vec::new() };
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (form_decode(k), form_decode(v))
            })
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn form_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced).decode_utf8_lossy().to_string()
}

pub async fn read_request<S>(stream: &mut S) -> Result<Request, StatusCode>
where
    S: AsyncReadExt + Unpin,
{
    // Read headers up to CRLFCRLF with total cap
    let mut buf = Vec::with_capacity(4096);
    let mut tmp = [0u8; 2048];
    // resume scanning where the last read ended, with overlap for a split terminator
    let mut search_from: usize = 0;
    let finder = Finder::new(b"\r\n\r\n");
    let header_end = loop {
        let n = stream.read(&mut tmp).await.map_err(|_| StatusCode::InternalServerError)?;
        if n == 0 {
            return Err(StatusCode::BadRequest);
        }
        buf.extend_from_slice(&tmp[..n]);
        limits::check_head(buf.len()).map_err(|e| e.status())?;
        let start = search_from.saturating_sub(3);
        if let Some(rel) = finder.find(&buf[start..]) {
            break start + rel;
        }
        search_from = buf.len();
    };
    let (head, rest) = buf.split_at(header_end + 4);
    let head_str = std::str::from_utf8(head).map_err(|_| StatusCode::BadRequest)?;
    let mut lines = head_str.split("\r\n");
    let start = lines.next().unwrap_or("");
    let mut sp = start.split_whitespace();
    let method = sp.next().unwrap_or("").to_string();
    let path = sp.next().unwrap_or("").to_string();
    let version = sp.next().unwrap_or("");
    if method.is_empty() || !path.starts_with('/') || !version.starts_with("HTTP/1.") {
        return Err(StatusCode::BadRequest);
    }

    let mut headers = Vec::new();
    let mut content_length: usize = 0;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if let Some(idx) = memchr(b':', line.as_bytes()) {
            let (name_raw, value_raw) = line.split_at(idx);
            let name = name_raw.trim().to_ascii_lowercase();
            let value = value_raw[1..].trim().to_string(); // skip ':'
            if name == "content-length" {
                content_length = value.parse::<usize>().map_err(|_| StatusCode::BadRequest)?;
            }
            headers.push((name, value));
        }
    }

    let mut body = Vec::new();
    if content_length > 0 {
        limits::check_body(header_end + 4, content_length).map_err(|e| e.status())?;
        body.extend_from_slice(rest);
        while body.len() < content_length {
            let mut chunk = [0u8; 4096];
            let n = stream.read(&mut chunk).await.map_err(|_| StatusCode::InternalServerError)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(content_length);
    }

    Ok(Request { method, path, headers, body })
}

#[derive(Debug, Clone)]
pub struct Response {
    pub code: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        make_response(self.code, &self.headers, &self.body)
    }
}

/// One response per connection: every response closes it.
pub fn make_response(code: StatusCode, headers: &[(String, String)], body: &[u8]) -> Vec<u8> {
    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    let mut out = format!(
        "HTTP/1.1 {} {}\r\nserver: ghsearchd\r\ndate: {}\r\nconnection: close\r\n",
        code.as_u16(),
        code.reason(),
        date
    )
    .into_bytes();
    let mut had_ct = false;
    for (k, v) in headers {
        if k.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if k.eq_ignore_ascii_case("content-type") {
            had_ct = true;
        }
        out.extend_from_slice(k.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(v.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    if !had_ct {
        out.extend_from_slice(b"content-type: application/json\r\n");
    }
    out.extend_from_slice(format!("content-length: {}\r\n", body.len()).as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn query_pairs_decode_percent_and_plus() {
        let req = Request::get("/search?q=octo+cat%21&next=Y3Vy%2B%3D&flag");
        assert_eq!(req.route(), "/search");
        assert_eq!(
            req.query_pairs(),
            vec![
                ("q".to_string(), "octo cat!".to_string()),
                ("next".to_string(), "Y3Vy+=".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn reads_start_line_headers_and_body() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        client
            .write_all(b"GET /search?q=rust HTTP/1.1\r\nHost: proxy\r\nContent-Length: 2\r\n\r\nhi")
            .await
            .unwrap();
        let req = read_request(&mut server).await.expect("valid request");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/search?q=rust");
        assert_eq!(req.header("host"), Some("proxy"));
        assert_eq!(req.body, b"hi");
    }

    #[tokio::test]
    async fn rejects_non_http_start_line() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        client.write_all(b"BREW /pot HTCPCP/1.0\r\n\r\n").await.unwrap();
        assert_eq!(read_request(&mut server).await.unwrap_err(), StatusCode::BadRequest);
    }

    #[tokio::test]
    async fn declared_body_over_the_cap_is_refused_unread() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        client
            .write_all(b"GET /search?q=rust HTTP/1.1\r\ncontent-length: 65536\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(read_request(&mut server).await.unwrap_err(), StatusCode::RequestEntityTooLarge);
    }

    #[test]
    fn response_frames_status_and_length() {
        let bytes = make_response(StatusCode::NotFound, &[], b"{}");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("content-type: application/json\r\n"));
        assert!(text.contains("content-length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\n{}"));
    }
}
