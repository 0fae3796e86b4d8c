//! `HttpApi` against a throwaway HTTP server.
//!
//! The server accepts one connection per scripted response, records the
//! request it received, answers, and closes the connection. That is enough
//! to check the wire format of all three calls without a real service.

use cv_workflow::{
    ClientConfig, FileUpload, FormField, HttpApi, Session, Step, WorkflowApi, WorkflowError,
    WorkflowState,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ── Test server ──────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Captured {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serve `responses` in order, one connection each. Returns the API base
/// URL and a handle yielding the captured requests.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            captured.push(read_request(&mut stream).await);
            let reply = format!(
                "HTTP/1.1 {status} Scripted\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        captured
    });

    (format!("http://{addr}/api/v1"), handle)
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let mut body = buf[header_end..].to_vec();
    if let Some(len) = headers.get("content-length").and_then(|v| v.parse::<usize>().ok()) {
        while body.len() < len {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-body");
            body.extend_from_slice(&chunk[..n]);
        }
    } else if headers
        .get("transfer-encoding")
        .is_some_and(|v| v.contains("chunked"))
    {
        while !body.ends_with(b"0\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-body");
            body.extend_from_slice(&chunk[..n]);
        }
        body = dechunk(&body);
    }

    Captured {
        method,
        path,
        headers,
        body,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(line_end) = find(raw, b"\r\n") {
        let size_field = String::from_utf8_lossy(&raw[..line_end]);
        let size = usize::from_str_radix(size_field.split(';').next().unwrap_or("0").trim(), 16)
            .unwrap_or(0);
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        out.extend_from_slice(&raw[start..start + size]);
        raw = &raw[start + size + 2..];
    }
    out
}

fn api_for(base: &str) -> HttpApi {
    let config = ClientConfig::builder()
        .api_base(base)
        .timeout_secs(10)
        .build()
        .unwrap();
    HttpApi::new(config).unwrap()
}

fn pdf() -> FileUpload {
    FileUpload::from_bytes("cv.pdf", b"%PDF-1.7 hello".to_vec()).unwrap()
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_sends_multipart_file_part() {
    let (base, server) = serve(vec![(200, r#"{"key":"f1"}"#)]).await;
    let api = api_for(&base);

    let reply = api.save_file(&pdf()).await.unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"key":"f1"}"#);

    let req = server.await.unwrap().remove(0);
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v1/cvs/save");
    assert!(
        req.headers["content-type"].starts_with("multipart/form-data; boundary="),
        "got {:?}",
        req.headers.get("content-type")
    );

    let body = req.body_text();
    let lower = body.to_lowercase();
    assert!(lower.contains(r#"name="file""#), "body: {body}");
    assert!(lower.contains(r#"filename="cv.pdf""#), "body: {body}");
    assert!(lower.contains("content-type: application/pdf"), "body: {body}");
    assert!(body.contains("%PDF-1.7 hello"), "body: {body}");
}

#[tokio::test]
async fn extract_sends_file_id_json() {
    let (base, server) = serve(vec![(200, r#"{"name":"Ada"}"#)]).await;
    let api = api_for(&base);

    let reply = api.extract("f1").await.unwrap();
    assert!(reply.is_success());

    let req = server.await.unwrap().remove(0);
    assert_eq!(req.path, "/api/v1/cvs/extract");
    assert!(req.headers["content-type"].starts_with("application/json"));
    assert_eq!(req.json(), json!({"fileId": "f1"}));
}

#[tokio::test]
async fn non_2xx_body_comes_back_verbatim() {
    let (base, server) = serve(vec![(500, "server error")]).await;
    let api = api_for(&base);

    let reply = api.extract("f1").await.unwrap();
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, "server error");
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = api_for(&format!("http://{addr}/api/v1"));
    let err = api.save_file(&pdf()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Transport { step: Step::Upload, .. }));
}

// ── Full session over HTTP ───────────────────────────────────────────────────

#[tokio::test]
async fn session_over_http() {
    let (base, server) = serve(vec![
        (200, r#"{"key":"f1"}"#),
        (
            200,
            r#"{"name":"Ada","hardSkills":["C++"],"travelMode":"car","currentEmployer":null}"#,
        ),
        (200, r#"{"subject":"Candidate Ada","sent":false}"#),
    ])
    .await;
    let mut session = Session::new(Arc::new(api_for(&base)));

    session.upload(&pdf()).await.unwrap();
    session.extract().await.unwrap();
    let mut form = session.review_form().unwrap();
    form.set(FormField::Age, "30").unwrap();
    let state = session.submit(&form.to_profile()).await.unwrap();
    assert_eq!(
        state.response(),
        Some(&json!({"subject": "Candidate Ada", "sent": false}))
    );

    let requests = server.await.unwrap();
    assert_eq!(requests[1].json(), json!({"fileId": "f1"}));

    let submit = &requests[2];
    assert_eq!(submit.path, "/api/v1/emails/generate");
    let payload = submit.json();
    assert_eq!(payload["name"], json!("Ada"));
    assert_eq!(payload["hardSkills"], json!(["C++"]));
    assert_eq!(payload["travelMode"], json!("car"));
    assert_eq!(payload["age"], json!(30));
    assert_eq!(payload["currentEmployer"], Value::Null);
    assert_eq!(payload["hoursAWeek"], json!(8));
    assert_eq!(payload["salaryPeriod"], json!("year"));
    assert!(payload.get("jobDescriptionFile").is_none());
}

#[tokio::test]
async fn failed_submit_over_http_keeps_state() {
    let (base, server) = serve(vec![
        (200, r#"{"key":"f1"}"#),
        (200, "{}"),
        (500, "server error"),
    ])
    .await;
    let mut session = Session::new(Arc::new(api_for(&base)));

    session.upload(&pdf()).await.unwrap();
    session.extract().await.unwrap();
    let before: WorkflowState = session.state().clone();

    let profile = session.review_form().unwrap().to_profile();
    let err = session.submit(&profile).await.unwrap_err();
    assert_eq!(err.to_string(), "server error");
    assert_eq!(session.state(), &before);
    server.await.unwrap();
}
