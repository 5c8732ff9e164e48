//! The real `HttpTransport` against a local one-shot HTTP server.
//!
//! Each server thread accepts a fixed number of connections, answers them
//! with canned responses in order, and hands every raw request back over a
//! channel so the test can inspect headers and bodies.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mtg_wishlist::{HttpTransport, Transport, WishlistClient, WishlistError};

const AGENT: &str = "test-agent/1.0";

/// A raw request as received: lower-cased header lines plus the body.
struct Seen {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

impl Seen {
    fn has_header(&self, line: &str) -> bool {
        self.headers.iter().any(|h| h == line)
    }
}

struct Canned {
    status: &'static str,
    headers: Vec<String>,
    body: String,
}

fn canned(status: &'static str, headers: &[&str], body: &str) -> Canned {
    Canned {
        status,
        headers: headers.iter().map(|h| h.to_string()).collect(),
        body: body.to_string(),
    }
}

/// Serve `responses` one connection at a time. Returns the base URL, the
/// channel of received requests and the server thread.
fn serve(responses: Vec<Canned>) -> (String, Receiver<Seen>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        for canned in responses {
            let (mut stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            let mut length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    length = value.trim().parse().unwrap();
                }
                headers.push(lower);
            }
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body).unwrap();

            tx.send(Seen {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(body).unwrap(),
            })
            .unwrap();

            let mut reply = format!("HTTP/1.1 {}\r\n", canned.status);
            for header in &canned.headers {
                reply.push_str(header);
                reply.push_str("\r\n");
            }
            reply.push_str(&format!(
                "Content-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                canned.body.len(),
                canned.body
            ));
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    (base, rx, handle)
}

fn transport() -> HttpTransport {
    HttpTransport::new(AGENT, Duration::from_secs(5)).unwrap()
}

// ---------------------------------------------------------------------------
// Status handling
// ---------------------------------------------------------------------------

#[test]
fn server_error_becomes_status_error() {
    let (base, rx, server) = serve(vec![canned("500 Internal Server Error", &[], "boom")]);
    let url = format!("{}/myaccount/wishlist?page=1", base);

    match transport().get(&url, Some("tok")) {
        Err(WishlistError::Status { status, url: failed }) => {
            assert_eq!(status, 500);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {:?}", other.map(|r| r.status)),
    }
    server.join().unwrap();
    assert!(rx.recv().unwrap().request_line.starts_with("GET /myaccount/wishlist?page=1 "));
}

#[test]
fn success_returns_body_and_status() {
    let (base, _rx, server) = serve(vec![canned("200 OK", &[], "<html>hi</html>")]);
    let resp = transport().get(&format!("{}/", base), None).unwrap();
    server.join().unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "<html>hi</html>");
    assert!(resp.cookies.is_empty());
}

#[test]
fn connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport().get(&format!("http://{}/", addr), None).unwrap_err();
    assert!(matches!(err, WishlistError::Http(_)));
    assert!(err.is_transport());
}

// ---------------------------------------------------------------------------
// Headers and cookies
// ---------------------------------------------------------------------------

#[test]
fn get_sends_session_cookie_and_user_agent() {
    let (base, rx, server) = serve(vec![canned("200 OK", &[], "")]);
    transport().get(&format!("{}/myaccount/profile", base), Some("abc123")).unwrap();
    server.join().unwrap();

    let seen = rx.recv().unwrap();
    assert!(seen.has_header("cookie: laravel_session=abc123"), "{:?}", seen.headers);
    assert!(seen.has_header("user-agent: test-agent/1.0"), "{:?}", seen.headers);
}

#[test]
fn get_without_session_sends_no_cookie() {
    let (base, rx, server) = serve(vec![canned("200 OK", &[], "")]);
    transport().get(&format!("{}/", base), None).unwrap();
    server.join().unwrap();

    let seen = rx.recv().unwrap();
    assert!(!seen.headers.iter().any(|h| h.starts_with("cookie:")));
    assert!(seen.has_header("user-agent: test-agent/1.0"));
}

#[test]
fn set_cookie_is_exposed_on_the_response() {
    let (base, _rx, server) = serve(vec![canned(
        "200 OK",
        &["Set-Cookie: laravel_session=x; Path=/; HttpOnly"],
        "",
    )]);
    let resp = transport().get(&format!("{}/", base), None).unwrap();
    server.join().unwrap();

    assert_eq!(resp.cookie("laravel_session"), Some("x"));
    assert_eq!(resp.cookie("other"), None);
}

#[test]
fn post_form_sends_urlencoded_fields() {
    let (base, rx, server) = serve(vec![canned("200 OK", &[], "")]);
    let mut fields = BTreeMap::new();
    fields.insert("_token".to_string(), "csrf".to_string());
    fields.insert("email".to_string(), "me@example.com".to_string());
    fields.insert("password".to_string(), "p&ss word".to_string());
    transport()
        .post_form(&format!("{}/customer_login", base), &fields)
        .unwrap();
    server.join().unwrap();

    let seen = rx.recv().unwrap();
    assert!(seen.request_line.starts_with("POST /customer_login "));
    assert!(seen.has_header("content-type: application/x-www-form-urlencoded"));
    assert!(seen.has_header("user-agent: test-agent/1.0"));
    assert_eq!(seen.body, "_token=csrf&email=me%40example.com&password=p%26ss+word");
}

// ---------------------------------------------------------------------------
// Login handshake over the wire
// ---------------------------------------------------------------------------

const LOGIN_FORM: &str = r#"<html><body>
  <form action="/customer_login" method="post">
    <input type="hidden" name="_token" value="csrf-abc">
    <input type="email" name="email">
    <input type="password" name="password">
  </form>
</body></html>"#;

#[test]
fn authenticate_against_local_server() {
    let (base, rx, server) = serve(vec![
        canned("200 OK", &[], LOGIN_FORM),
        canned(
            "200 OK",
            &["Set-Cookie: laravel_session=fresh-session; Path=/"],
            "<html>welcome</html>",
        ),
    ]);
    let client = WishlistClient::builder()
        .base_url(&base)
        .user_agent(AGENT)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let token = client.auth().authenticate("me@example.com", "hunter2").unwrap();
    server.join().unwrap();
    assert_eq!(token, "fresh-session");

    let login_page = rx.recv().unwrap();
    assert!(login_page.request_line.starts_with("GET /customer_login "));
    let submit = rx.recv().unwrap();
    assert!(submit.request_line.starts_with("POST /customer_login "));
    assert_eq!(
        submit.body,
        "_token=csrf-abc&email=me%40example.com&password=hunter2"
    );
}
