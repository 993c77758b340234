//! Tiny HTTP/1.1 server for integration tests.
//!
//! Serves canned responses by path and records every requested path, so tests
//! can check which segments were fetched and in what order.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with the body written in `chunk`-sized pieces.
    Body { body: Vec<u8>, chunk: usize },
    /// Announces `declared` bytes, sends `body`, then drops the connection.
    Truncated { body: Vec<u8>, declared: usize },
    Status(u16),
}

impl Route {
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Route::Body { body: body.into(), chunk: 1 }
    }
}

pub struct SegmentServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl SegmentServer {
    /// Paths are matched without their leading slashes.
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let routes: HashMap<String, Route> = routes
            .into_iter()
            .map(|(path, route)| (path.trim_start_matches('/').to_string(), route))
            .collect();
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/", port),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .trim_start_matches('/')
        .to_string();

    log.lock().unwrap().push(path.clone());

    match routes.get(&path) {
        Some(Route::Body { body, chunk }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            for piece in body.chunks((*chunk).max(1)) {
                let _ = stream.write_all(piece);
                let _ = stream.flush();
            }
        }
        Some(Route::Truncated { body, declared }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            let _ = stream.flush();
        }
        Some(Route::Status(code)) => {
            let head = format!(
                "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code
            );
            let _ = stream.write_all(head.as_bytes());
        }
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
}
