//! Single-request HTTP stand-in for completion providers.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// What the fake provider received.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    /// First line, such as `POST /chat/completions HTTP/1.1`.
    pub request_line: String,
    /// Header names lowercased, values trimmed.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl CapturedRequest {
    /// Value of the first header called `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body decoded as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or_else(|err| {
            panic!("request body is not JSON ({err}): {}", self.body);
        })
    }
}

/// A listener answering exactly one request with a canned response.
#[derive(Debug)]
pub struct FakeProvider {
    base_url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl FakeProvider {
    /// Base URL to configure the client with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait for the served request.
    pub fn finish(self) -> CapturedRequest {
        self.handle
            .join()
            .unwrap_or_else(|_| panic!("fake provider thread panicked"))
    }
}

/// Body of a successful chat completion whose first choice says `content`.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ]
    })
    .to_string()
}

/// Serve one request with `status` (such as `200 OK`) and `body`.
pub fn serve_once(status: &str, body: &str) -> FakeProvider {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap_or_else(|err| {
        panic!("failed to bind local test listener: {err}");
    });
    let addr = listener.local_addr().unwrap_or_else(|err| {
        panic!("listener has no local address: {err}");
    });
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap_or_else(|err| {
            panic!("failed to accept test connection: {err}");
        });
        let request = read_request(&mut stream);
        stream
            .write_all(response.as_bytes())
            .unwrap_or_else(|err| panic!("failed to write response: {err}"));
        request
    });
    FakeProvider {
        base_url: format!("http://{addr}/v1"),
        handle,
    }
}

fn read_request(stream: &mut std::net::TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);
    let mut captured = CapturedRequest::default();
    let mut line = String::new();
    reader
        .read_line(&mut captured.request_line)
        .unwrap_or_else(|err| panic!("failed to read request line: {err}"));
    captured.request_line = captured.request_line.trim_end().to_owned();
    loop {
        line.clear();
        reader
            .read_line(&mut line)
            .unwrap_or_else(|err| panic!("failed to read header: {err}"));
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            captured
                .headers
                .push((name.to_ascii_lowercase(), value.trim().to_owned()));
        }
    }
    let length = captured
        .header("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0_u8; length];
    reader
        .read_exact(&mut body)
        .unwrap_or_else(|err| panic!("failed to read body: {err}"));
    captured.body = String::from_utf8_lossy(&body).into_owned();
    captured
}
