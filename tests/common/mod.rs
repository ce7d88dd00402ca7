#![allow(dead_code)]

use eyre::{eyre, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Request seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub body: String,
}

/// HTTP endpoint answering requests with canned responses
pub struct StubServer {
    pub url: String,
    requests: mpsc::UnboundedReceiver<RecordedRequest>,
}

impl StubServer {
    /// Same response to every request
    pub async fn start(status: u16, body: &'static str) -> Result<Self> {
        Self::start_sequence(vec![(status, body)]).await
    }

    /// Responses in order, one per connection; the last one repeats
    pub async fn start_sequence(responses: Vec<(u16, &'static str)>) -> Result<Self> {
        if responses.is_empty() {
            return Err(eyre!("stub needs at least one response"));
        }
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let (tx, requests) = mpsc::unbounded_channel();
        let responses = Arc::new(responses);
        let served = Arc::new(AtomicUsize::new(0));

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let index = served.fetch_add(1, Ordering::SeqCst).min(responses.len() - 1);
                let (status, body) = responses[index];
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(request) = handle(stream, status, body).await {
                        let _ = tx.send(request);
                    }
                });
            }
        });

        Ok(Self { url, requests })
    }

    /// Next request received, in arrival order
    pub async fn next_request(&mut self) -> Result<RecordedRequest> {
        self.requests
            .recv()
            .await
            .ok_or_else(|| eyre!("stub server stopped"))
    }
}

/// Endpoint that accepts connections and never answers
pub async fn silent_endpoint() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    Ok(url)
}

async fn handle(mut stream: TcpStream, status: u16, body: &str) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok()?;

    Some(RecordedRequest {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}
