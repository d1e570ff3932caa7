#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub const STEP_TIMEOUT: Duration = Duration::from_secs(3);

/// One HTTP request as the mock server saw it.
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self) -> Option<&str> {
        let mut parts = self.target.splitn(2, '?');
        parts.next();
        parts.next()
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(header, _)| *header == name)
            .map(|(_, value)| value.as_str())
    }
}

struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

/// Minimal scripted HTTP/1.1 server on an ephemeral localhost port.
///
/// Responses are served in FIFO order from the enqueued scripts; every
/// request that arrives is pushed to the channel read by `recv_request`.
/// Connections are closed after one exchange so each request arrives on a
/// fresh socket.
pub struct MockApiServer {
    addr: SocketAddr,
    responses: Arc<Mutex<VecDeque<CannedResponse>>>,
    request_rx: mpsc::Receiver<CapturedRequest>,
    server_task: JoinHandle<()>,
}

impl MockApiServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let responses: Arc<Mutex<VecDeque<CannedResponse>>> =
            Arc::new(Mutex::new(VecDeque::new()));
        let (request_tx, request_rx) = mpsc::channel(64);

        let task_responses = Arc::clone(&responses);
        let server_task = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(_) => break,
                };

                let responses = Arc::clone(&task_responses);
                let request_tx = request_tx.clone();

                tokio::spawn(async move {
                    let mut stream = stream;
                    let request = match read_request(&mut stream).await {
                        Ok(Some(request)) => request,
                        _ => return,
                    };

                    let response = responses.lock().unwrap().pop_front();
                    let _ = request_tx.send(request).await;

                    let response = response.unwrap_or(CannedResponse {
                        status: 500,
                        content_type: "text/plain",
                        body: "mock server: no scripted response left".to_string(),
                    });
                    let _ = write_response(&mut stream, &response).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Ok(Self {
            addr,
            responses,
            request_rx,
            server_task,
        })
    }

    /// Base URL to hand to the client settings, including the `/v1` prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn enqueue_json(&self, status: u16, body: Value) {
        self.enqueue_raw(status, "application/json", &body.to_string());
    }

    pub fn enqueue_raw(&self, status: u16, content_type: &'static str, body: &str) {
        self.responses.lock().unwrap().push_back(CannedResponse {
            status,
            content_type,
            body: body.to_string(),
        });
    }

    pub async fn recv_request(&mut self) -> CapturedRequest {
        timeout(STEP_TIMEOUT, self.request_rx.recv())
            .await
            .expect("timed out waiting for request")
            .expect("mock server request channel closed")
    }

    /// True when no request arrives within `wait`.
    pub async fn no_request_within(&mut self, wait: Duration) -> bool {
        !matches!(timeout(wait, self.request_rx.recv()).await, Ok(Some(_)))
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<CapturedRequest>> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let header_text = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            line.split_once(':')
                .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(Some(CapturedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }))
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

async fn write_response(
    stream: &mut TcpStream,
    response: &CannedResponse,
) -> std::io::Result<()> {
    let reason = match response.status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Mock",
    };
    let payload = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.content_type,
        response.body.len(),
        response.body
    );
    stream.write_all(payload.as_bytes()).await
}
