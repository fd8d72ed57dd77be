//! Minimal HTTP/1.1 server for pipeline integration tests.
//!
//! Serves a fixed set of paths (an HTML page plus media bodies). Responds to
//! HEAD with Content-Length and to GET with the body, optionally trickling it
//! out in delayed chunks so progress sampling and concurrency limits are
//! observable from the outside.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct MediaServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, responses omit Content-Length and the body is delimited by
    /// connection close.
    pub content_length_present: bool,
    /// Trickle GET bodies in 1 KiB chunks with this delay between writes.
    pub chunk_delay: Option<Duration>,
}

impl Default for MediaServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            content_length_present: true,
            chunk_delay: None,
        }
    }
}

/// Request counters updated by the server threads. Only media transfers are
/// counted: the HTML page at the root route is served but not tracked, so the
/// counters reflect download GETs alone.
#[derive(Debug, Default)]
pub struct ServerStats {
    in_flight_gets: AtomicUsize,
    max_in_flight_gets: AtomicUsize,
    total_gets: AtomicUsize,
}

impl ServerStats {
    pub fn max_in_flight_gets(&self) -> usize {
        self.max_in_flight_gets.load(Ordering::SeqCst)
    }

    pub fn total_gets(&self) -> usize {
        self.total_gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `routes` (path, body)
/// pairs. Returns the base URL, e.g. "http://127.0.0.1:12345/". The server
/// runs until the process exits.
pub fn start(routes: Vec<(String, Vec<u8>)>) -> String {
    start_with_options(routes, MediaServerOptions::default()).0
}

/// Like `start` but with custom behavior and access to request counters.
pub fn start_with_options(
    routes: Vec<(String, Vec<u8>)>,
    opts: MediaServerOptions,
) -> (String, Arc<ServerStats>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let stats = Arc::new(ServerStats::default());
    let accept_stats = Arc::clone(&stats);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let stats = Arc::clone(&accept_stats);
            thread::spawn(move || handle(stream, &routes, opts, &stats));
        }
    });
    (format!("http://127.0.0.1:{}/", port), stats)
}

fn handle(
    mut stream: TcpStream,
    routes: &[(String, Vec<u8>)],
    opts: MediaServerOptions,
    stats: &ServerStats,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path) = parse_request_line(request);

    let Some((_, body)) = routes.iter().find(|(route, _)| route == path) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n");
        return;
    };

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
            return;
        }
        let _ = stream.write_all(head_lines(body.len(), opts).as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        // The root route is the HTML page, not a media body; the counters
        // observe download transfers only.
        let is_media = path != "/";
        if is_media {
            stats.total_gets.fetch_add(1, Ordering::SeqCst);
            let now = stats.in_flight_gets.fetch_add(1, Ordering::SeqCst) + 1;
            stats.max_in_flight_gets.fetch_max(now, Ordering::SeqCst);
        }

        let _ = stream.write_all(head_lines(body.len(), opts).as_bytes());
        match opts.chunk_delay {
            Some(delay) => {
                // Delay between chunks only: a sleep after the last write
                // would hold the in-flight slot past the client-visible end
                // of the transfer.
                let mut chunks = body.chunks(1024).peekable();
                while let Some(chunk) = chunks.next() {
                    if stream.write_all(chunk).is_err() {
                        break;
                    }
                    let _ = stream.flush();
                    if chunks.peek().is_some() {
                        thread::sleep(delay);
                    }
                }
            }
            None => {
                let _ = stream.write_all(body);
            }
        }

        if is_media {
            stats.in_flight_gets.fetch_sub(1, Ordering::SeqCst);
        }
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
}

fn head_lines(body_len: usize, opts: MediaServerOptions) -> String {
    let content_length = if opts.content_length_present {
        format!("Content-Length: {}\r\n", body_len)
    } else {
        String::new()
    };
    format!("HTTP/1.1 200 OK\r\n{}Connection: close\r\n\r\n", content_length)
}

/// Returns (method, path) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}
