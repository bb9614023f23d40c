//! Integration tests for the `triage serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port,
//! makes HTTP requests, and verifies the responses.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so separate test binaries
/// don't collide on the same port range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Helper: start `triage serve` on the given port.
fn start_server(port: u16, api_key: Option<&str>) -> Child {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_triage"));
    cmd.current_dir(workspace_root);
    cmd.arg("serve").arg("--port").arg(port.to_string());
    match api_key {
        Some(k) => cmd.env("TRIAGE_API_KEY", k),
        None => cmd.env_remove("TRIAGE_API_KEY"),
    };
    // Redirect stdout/stderr to avoid blocking
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let child = cmd.spawn().expect("failed to start triage serve");
    // Wait for server to be ready by polling the port
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            return child;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    child
}

fn stop(mut child: Child) {
    child.kill().ok();
    child.wait().ok();
}

/// Helper: send one HTTP/1.1 request and return (status, headers, body).
fn http_request(
    port: u16,
    method: &str,
    path: &str,
    extra_headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let mut header_lines = String::new();
    for (name, value) in extra_headers {
        header_lines.push_str(&format!("{}: {}\r\n", name, value));
    }
    if let Some(b) = body {
        header_lines.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n",
            b.len()
        ));
    }

    let request = format!(
        "{} {} HTTP/1.1\r\nHost: localhost:{}\r\n{}Connection: close\r\n\r\n{}",
        method,
        path,
        port,
        header_lines,
        body.unwrap_or("")
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response_full(&response)
}

fn http_get(port: u16, path: &str) -> (u16, String) {
    let (status, _, body) = http_request(port, "GET", path, &[], None);
    (status, body)
}

fn http_post(port: u16, path: &str, body: &str) -> (u16, String) {
    let (status, _, body) = http_request(port, "POST", path, &[], Some(body));
    (status, body)
}

/// Extract a header value from raw headers string.
fn extract_header<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    let name_lower = name.to_lowercase();
    for line in headers.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().to_lowercase() == name_lower {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Parse an HTTP response into (status_code, headers_string, body).
fn parse_http_response_full(response: &str) -> (u16, String, String) {
    let parts: Vec<&str> = response.splitn(2, "\r\n\r\n").collect();
    let headers = parts.first().unwrap_or(&"").to_string();
    let body = parts.get(1).unwrap_or(&"").to_string();

    let status_line = headers.lines().next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    let chunked = extract_header(&headers, "transfer-encoding")
        .map(|v| v.eq_ignore_ascii_case("chunked"))
        .unwrap_or(false);
    let body = if chunked { decode_chunked(&body) } else { body };

    (status, headers, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(data: &str) -> String {
    let mut result = String::new();
    let mut remaining = data;

    while let Some(line_end) = remaining.find("\r\n") {
        let size = match usize::from_str_radix(remaining[..line_end].trim(), 16) {
            Ok(s) => s,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + size;
        if chunk_end > remaining.len() {
            result.push_str(&remaining[chunk_start..]);
            break;
        }
        result.push_str(&remaining[chunk_start..chunk_end]);
        remaining = remaining.get(chunk_end + 2..).unwrap_or("");
    }

    result
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("valid JSON")
}

#[test]
fn health_returns_200_with_catalog() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, body) = http_get(port, "/health");
    stop(child);

    assert_eq!(status, 200);
    let json = json(&body);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["catalog"], "fever-triage");
    assert_eq!(json["rules"], 75);
}

#[test]
fn catalog_listings() {
    let port = next_port();
    let child = start_server(port, None);

    let (s1, symptoms) = http_get(port, "/symptoms");
    let (s2, diseases) = http_get(port, "/diseases");
    let (s3, rules) = http_get(port, "/rules?disease=typhoid");
    let (s4, missing) = http_get(port, "/rules?disease=ebola");
    stop(child);

    assert_eq!(s1, 200);
    assert_eq!(json(&symptoms)["symptoms"].as_array().unwrap().len(), 34);

    assert_eq!(s2, 200);
    let diseases = json(&diseases);
    assert_eq!(diseases["diseases"][1]["id"], "dengue");
    assert_eq!(diseases["diseases"][1]["severity"], "high");

    assert_eq!(s3, 200);
    let rules = json(&rules);
    let rules = rules["rules"].as_array().unwrap();
    assert!(rules.iter().all(|r| r["disease"] == "typhoid"));
    assert_eq!(rules[0]["id"], "R21");

    assert_eq!(s4, 404);
    assert!(json(&missing)["error"].as_str().unwrap().contains("ebola"));
}

#[test]
fn diagnose_ranks_and_explains() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, body) = http_post(
        port,
        "/diagnose",
        r#"{"symptoms": ["high_fever", "severe_headache", "pain_behind_eyes"], "explain_top": 1}"#,
    );
    stop(child);

    assert_eq!(status, 200);
    let json = json(&body);
    assert_eq!(json["report"]["diagnoses"][0]["disease"], "dengue");
    assert_eq!(json["report"]["total_score"], 49.0);
    let explanations = json["explanations"].as_array().unwrap();
    assert_eq!(explanations.len(), 1);
    assert_eq!(explanations[0]["total_boost"], 39.0);
    assert_eq!(explanations[0]["rules"][0]["rule"], "R07");
}

#[test]
fn diagnose_empty_symptoms_is_empty_report() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, body) = http_post(port, "/diagnose", r#"{"symptoms": []}"#);
    stop(child);

    assert_eq!(status, 200);
    let json = json(&body);
    assert_eq!(json["report"]["diagnoses"].as_array().unwrap().len(), 0);
    assert_eq!(json["fired_rules"].as_array().unwrap().len(), 0);
}

#[test]
fn diagnose_rejects_bad_requests() {
    let port = next_port();
    let child = start_server(port, None);

    let (unknown_status, unknown_body) =
        http_post(port, "/diagnose", r#"{"symptoms": ["cough", "purple_toes"]}"#);
    let (missing_status, missing_body) = http_post(port, "/diagnose", r#"{"facts": []}"#);
    let (type_status, _) = http_post(port, "/diagnose", r#"{"symptoms": [1, 2]}"#);
    stop(child);

    assert_eq!(unknown_status, 400);
    let unknown = json(&unknown_body);
    assert_eq!(unknown["unknown"], serde_json::json!(["purple_toes"]));
    assert_eq!(unknown["error"], "unknown symptom: purple_toes");

    assert_eq!(missing_status, 400);
    assert_eq!(json(&missing_body)["error"], "missing 'symptoms' array");

    assert_eq!(type_status, 400);
}

#[test]
fn explain_endpoint() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, body) = http_post(
        port,
        "/explain",
        r#"{"disease": "malaria", "symptoms": ["cyclical_fever", "chills", "sweating"]}"#,
    );
    let (idle_status, idle_body) = http_post(
        port,
        "/explain",
        r#"{"disease": "typhoid", "symptoms": ["cough"]}"#,
    );
    let (unknown_status, _) = http_post(
        port,
        "/explain",
        r#"{"disease": "ebola", "symptoms": ["cough"]}"#,
    );
    stop(child);

    assert_eq!(status, 200);
    let json_ok = json(&body);
    assert_eq!(json_ok["fired"], true);
    assert_eq!(json_ok["confidence"], 100.0);
    assert_eq!(json_ok["explanation"]["rules"].as_array().unwrap().len(), 4);
    assert!(json_ok["summary"]
        .as_str()
        .unwrap()
        .starts_with("Malaria diagnosed with 100.0% confidence"));

    assert_eq!(idle_status, 200);
    let idle = json(&idle_body);
    assert_eq!(idle["fired"], false);
    assert!(idle["summary"].is_null());
    assert_eq!(idle["explanation"]["rules"].as_array().unwrap().len(), 0);

    assert_eq!(unknown_status, 404);
}

#[test]
fn not_found_returns_404() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, body) = http_get(port, "/treatments");
    stop(child);

    assert_eq!(status, 404);
    assert_eq!(json(&body)["error"], "not found");
}

#[test]
fn api_key_required_when_configured() {
    let port = next_port();
    let child = start_server(port, Some("s3cret"));

    let (health, _) = http_get(port, "/health");
    let (anon, _) = http_get(port, "/symptoms");
    let (bearer, _, _) = http_request(
        port,
        "GET",
        "/symptoms",
        &[("Authorization", "Bearer s3cret")],
        None,
    );
    let (header, _, _) = http_request(port, "GET", "/symptoms", &[("X-API-Key", "s3cret")], None);
    let (wrong, _, _) = http_request(port, "GET", "/symptoms", &[("X-API-Key", "nope")], None);
    stop(child);

    assert_eq!(health, 200);
    assert_eq!(anon, 401);
    assert_eq!(bearer, 200);
    assert_eq!(header, 200);
    assert_eq!(wrong, 403);
}

#[test]
fn cors_headers_present() {
    let port = next_port();
    let child = start_server(port, None);

    let (status, headers, _) = http_request(
        port,
        "GET",
        "/health",
        &[("Origin", "http://example.com")],
        None,
    );
    stop(child);

    assert_eq!(status, 200);
    assert_eq!(
        extract_header(&headers, "access-control-allow-origin"),
        Some("*")
    );
}
