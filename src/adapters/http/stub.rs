//! Minimal HTTP/1.1 responder on 127.0.0.1 for adapter tests.

use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Route {
    path: &'static str,
    status: u16,
    body: &'static str,
    set_cookie: Option<&'static str>,
}

impl Route {
    pub fn json(path: &'static str, status: u16, body: &'static str) -> Self {
        Self {
            path,
            status,
            body,
            set_cookie: None,
        }
    }

    pub fn with_cookie(mut self, set_cookie: &'static str) -> Self {
        self.set_cookie = Some(set_cookie);
        self
    }
}

/// Serves fixed responses by path; unknown paths get an empty 404.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let routes = Arc::new(routes);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = respond(stream, &routes, &log).await;
                });
            }
        });
        Self { base_url, requests }
    }

    /// Accepts connections and never answers.
    pub async fn stalled() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        Self {
            base_url,
            requests: Arc::default(),
        }
    }

    /// Raw request text (head and body), in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| request_path(r) == path)
            .count()
    }
}

fn request_path(request: &str) -> &str {
    let target = request.split_whitespace().nth(1).unwrap_or("");
    target.split('?').next().unwrap_or("")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0)
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]);
            if buf.len() >= end + 4 + content_length(&head) {
                break;
            }
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn respond(
    mut stream: TcpStream,
    routes: &[Route],
    log: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let request = read_request(&mut stream).await?;
    let path = request_path(&request).to_string();
    log.lock().unwrap().push(request);

    let route = routes.iter().find(|r| r.path == path);
    let (status, body) = route.map_or((404, ""), |r| (r.status, r.body));
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason,
        body.len()
    );
    if let Some(cookie) = route.and_then(|r| r.set_cookie) {
        response.push_str(&format!("Set-Cookie: {}\r\n", cookie));
    }
    response.push_str("\r\n");
    response.push_str(body);

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
