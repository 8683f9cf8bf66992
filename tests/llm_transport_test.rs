//! Request and reply shapes of each LLM provider, against a local fake endpoint.

use std::sync::Arc;
use std::time::Duration;
use tictactoe_oracle::{
    Board, FallbackReason, LlmClient, LlmConfig, LlmOracle, LlmProvider, Mark, MoveOracle,
    MoveSelector, OracleError, Position, SelectionSource, Square,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One HTTP request as the fake endpoint received it.
#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: serde_json::Value,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves exactly one request with `status` and `body`, returning the base URL.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            raw.extend_from_slice(&chunk[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = header_end + 4;
        while raw.len() < body_start + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            raw.extend_from_slice(&chunk[..n]);
        }
        let request_body: serde_json::Value =
            serde_json::from_slice(&raw[body_start..body_start + content_length])
                .unwrap_or(serde_json::Value::Null);

        let response = format!(
            "HTTP/1.1 {} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        CapturedRequest {
            request_line,
            headers,
            body: request_body,
        }
    });

    (base_url, handle)
}

fn oracle(provider: LlmProvider, base_url: &str) -> LlmOracle {
    let config = LlmConfig::new(
        provider,
        "k".to_string(),
        provider.default_model().to_string(),
        64,
    )
    .with_base_url(base_url);
    LlmOracle::new(LlmClient::new(config))
}

fn opening_board() -> Board {
    let mut board = Board::new();
    board.set(Position::TopLeft, Square::Occupied(Mark::X));
    board
}

#[tokio::test]
async fn test_gemini_request_and_reply() {
    let (base_url, server) = serve_once(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"{\"move\": 4}"}]}}]}"#,
    )
    .await;

    let index = oracle(LlmProvider::Gemini, &base_url)
        .suggest_move(&opening_board(), Mark::O)
        .await;
    assert_eq!(index, Ok(4));

    let request = server.await.unwrap();
    assert!(
        request
            .request_line
            .starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent "),
        "{}",
        request.request_line
    );
    assert_eq!(request.header("x-goog-api-key"), Some("k"));

    let generation = &request.body["generationConfig"];
    assert_eq!(generation["thinkingConfig"]["thinkingBudget"], 0);
    assert_eq!(generation["responseMimeType"], "application/json");
    assert_eq!(generation["responseSchema"]["properties"]["move"]["type"], "INTEGER");
    assert_eq!(generation["responseSchema"]["required"][0], "move");

    let prompt = request.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains(r#"["X",null,null,null,null,null,null,null,null]"#));
}

#[tokio::test]
async fn test_openai_request_and_reply() {
    let (base_url, server) = serve_once(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"{\"move\": 2}"}}]}"#,
    )
    .await;

    let index = oracle(LlmProvider::OpenAI, &base_url)
        .suggest_move(&opening_board(), Mark::O)
        .await;
    assert_eq!(index, Ok(2));

    let request = server.await.unwrap();
    assert!(request.request_line.starts_with("POST /v1/chat/completions "));
    assert_eq!(request.header("authorization"), Some("Bearer k"));
    assert_eq!(request.body["model"], "gpt-4o-mini");
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn test_anthropic_request_and_reply() {
    let (base_url, server) = serve_once(
        200,
        r#"{"content":[{"type":"text","text":"{\"move\": 7}"}]}"#,
    )
    .await;

    let index = oracle(LlmProvider::Anthropic, &base_url)
        .suggest_move(&opening_board(), Mark::O)
        .await;
    assert_eq!(index, Ok(7));

    let request = server.await.unwrap();
    assert!(request.request_line.starts_with("POST /v1/messages "));
    assert_eq!(request.header("x-api-key"), Some("k"));
    assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));
    assert!(request.body["system"].is_string());
    assert_eq!(request.body["max_tokens"], 64);
}

#[tokio::test]
async fn test_server_error_becomes_transport_error() {
    let (base_url, server) = serve_once(500, r#"{"error":"overloaded"}"#).await;

    let result = oracle(LlmProvider::Gemini, &base_url)
        .suggest_move(&opening_board(), Mark::O)
        .await;
    server.await.unwrap();

    match result {
        Err(OracleError::Transport(message)) => {
            assert!(message.contains("500"), "{message}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reply_without_text_becomes_transport_error() {
    let (base_url, server) = serve_once(200, r#"{"candidates":[]}"#).await;

    let result = oracle(LlmProvider::Gemini, &base_url)
        .suggest_move(&opening_board(), Mark::O)
        .await;
    server.await.unwrap();

    assert!(matches!(result, Err(OracleError::Transport(_))), "{result:?}");
}

#[tokio::test]
async fn test_selector_falls_back_on_server_error() {
    let (base_url, server) = serve_once(500, r#"{"error":"overloaded"}"#).await;
    let oracle: Arc<dyn MoveOracle> = Arc::new(oracle(LlmProvider::OpenAI, &base_url));
    let selector = MoveSelector::with_seed(oracle, Duration::from_secs(5), 21);

    let board = opening_board();
    let selection = selector.select(&board, Mark::O).await;
    server.await.unwrap();

    assert!(
        matches!(
            selection.source,
            SelectionSource::Fallback(FallbackReason::Oracle(OracleError::Transport(_)))
        ),
        "{:?}",
        selection.source
    );
    assert!(board.is_empty(selection.position));
}
