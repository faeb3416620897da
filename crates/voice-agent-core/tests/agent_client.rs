//! Exercises AgentClient and the controller against a throwaway HTTP listener.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use voice_agent_core::{
    AgentBackend, AgentClient, AgentError, Sender, TranscriptController, CONNECTION_ERROR_TEXT,
    SILENCE_TEXT,
};

/// Serve exactly one canned response, returning the request head it received.
async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/run-agent", listener.local_addr().unwrap());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

/// An address nothing is listening on
async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/run-agent", addr)
}

#[tokio::test]
async fn test_sends_plain_get_to_run_agent() {
    let (url, server) = serve_once("200 OK", r#"{"user_text":"hello","bot_text":"hi there"}"#).await;

    let reply = AgentClient::new(&url).run_agent().await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /run-agent HTTP/1.1\r\n"), "got {request:?}");
    assert_eq!(reply.user_text.as_deref(), Some("hello"));
    assert_eq!(reply.bot_text.as_deref(), Some("hi there"));
}

#[tokio::test]
async fn test_server_error_is_status_failure() {
    let (url, _server) = serve_once("500 Internal Server Error", r#"{"bot_text":"ignored"}"#).await;

    let err = AgentClient::new(&url).run_agent().await.unwrap_err();

    match err {
        AgentError::Status(status) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_decode_failure() {
    let (url, _server) = serve_once("200 OK", "<html>oops</html>").await;

    let err = AgentClient::new(&url).run_agent().await.unwrap_err();

    assert!(matches!(err, AgentError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let err = AgentClient::new(&refused_url().await).run_agent().await.unwrap_err();

    assert!(matches!(err, AgentError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_controller_maps_silent_turn_over_http() {
    let (url, _server) = serve_once("200 OK", "{}").await;
    let mut controller = TranscriptController::new(AgentClient::new(&url));

    controller.request_turn().await;

    let entries = controller.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].sender(), Sender::User);
    assert_eq!(entries[1].text(), SILENCE_TEXT);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_controller_absorbs_unreachable_backend() {
    let mut controller = TranscriptController::new(AgentClient::new(&refused_url().await));

    controller.request_turn().await;

    let entries = controller.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].sender(), Sender::Bot);
    assert_eq!(entries[1].text(), CONNECTION_ERROR_TEXT);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_controller_maps_http_500_to_single_error_entry() {
    let (url, _server) = serve_once("500 Internal Server Error", "").await;
    let mut controller = TranscriptController::new(AgentClient::new(&url));

    controller.request_turn().await;

    assert_eq!(controller.entries().len(), 2);
    assert_eq!(controller.entries()[1].text(), CONNECTION_ERROR_TEXT);
    assert!(!controller.is_busy());
}
