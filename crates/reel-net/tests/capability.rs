//! Capability client against a local one-shot HTTP server

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use reel_net::*;

/// Serve `response` to the first connection and return the request line
fn serve_once(response: String) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line
    });

    (base, handle)
}

#[test]
fn test_enabled_backend() {
    let body = r#"{"enabled": true}"#;
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (base, server) = serve_once(response);

    let client = HttpCapabilityClient::new(ResourceLoader::new().unwrap());
    let enabled = smol::block_on(client.transcoding_enabled(&base)).unwrap();

    assert!(enabled);
    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /api/transcoding/enabled "));
}

#[test]
fn test_server_error_is_reported() {
    let (base, server) = serve_once(
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    );

    let client = HttpCapabilityClient::new(ResourceLoader::new().unwrap());
    let result = smol::block_on(client.transcoding_enabled(&base));

    assert!(matches!(result, Err(NetError::HttpError { status: 500 })));
    server.join().unwrap();
}

#[test]
fn test_unreachable_backend() {
    // Bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = HttpCapabilityClient::new(ResourceLoader::new().unwrap());

    let result = smol::block_on(client.transcoding_enabled(&format!("http://127.0.0.1:{port}")));
    assert!(matches!(result, Err(NetError::Network(_))));
}
