//! Integration tests for the OpenAI-compatible provider
//!
//! Runs `OpenAiProvider` against a wiremock server. SSE bodies are set with
//! `set_body_raw` so the `Content-Type` is exactly `text/event-stream`.

use deepchat::config::ProviderConfig;
use deepchat::conversation::ApiMessage;
use deepchat::providers::{build_request, ChatProvider, OpenAiProvider, StreamChunk};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        api_key: "sk-test".to_string(),
        base_url: server.uri(),
        ..ProviderConfig::default()
    }
}

fn sse(events: &[serde_json::Value]) -> Vec<u8> {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

#[tokio::test]
async fn test_complete_sends_bearer_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"stream": false, "model": "deepseek-chat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "hello",
                    "reasoning_content": "thinking..."
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = OpenAiProvider::new(&config).expect("provider");
    let request = build_request(&config, vec![ApiMessage::user("hi")], false);

    let completion = provider.complete(&request).await.expect("complete failed");
    assert_eq!(completion.content, "hello");
    assert_eq!(completion.reasoning.as_deref(), Some("thinking..."));
}

#[tokio::test]
async fn test_stream_yields_reasoning_then_answer() {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"choices": [{"delta": {"role": "assistant", "content": ""}}]}),
        json!({"choices": [{"delta": {"reasoning_content": "想一"}}]}),
        json!({"choices": [{"delta": {"reasoning_content": "想"}}]}),
        json!({"choices": [{"delta": {"content": "你好"}}]}),
        json!({"choices": [{"delta": {"content": "！"}}]}),
    ]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = OpenAiProvider::new(&config).expect("provider");
    let request = build_request(&config, vec![ApiMessage::user("hi")], true);

    let chunks: Vec<StreamChunk> = provider
        .stream(&request)
        .await
        .expect("stream failed")
        .map(|c| c.expect("chunk error"))
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![
            StreamChunk::Reasoning("想一".to_string()),
            StreamChunk::Reasoning("想".to_string()),
            StreamChunk::Answer("你好".to_string()),
            StreamChunk::Answer("！".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_thinking_param_sent_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"thinking": {"type": "enabled"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.thinking_enabled = true;
    let provider = OpenAiProvider::new(&config).expect("provider");
    let request = build_request(&config, vec![ApiMessage::user("hi")], false);

    let completion = provider.complete(&request).await.expect("complete failed");
    assert_eq!(completion.content, "ok");
}

#[tokio::test]
async fn test_error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = OpenAiProvider::new(&config).expect("provider");
    let request = build_request(&config, vec![ApiMessage::user("hi")], true);

    let err = match provider.stream(&request).await {
        Ok(_) => panic!("stream should fail on 401"),
        Err(e) => e,
    };
    let message = err.to_string();
    assert!(message.contains("401"), "unexpected error: {}", message);
    assert!(message.contains("invalid api key"));
}

#[tokio::test]
async fn test_connection_test_and_title_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"max_tokens": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "连接成功"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"max_tokens": 50, "model": "deepseek-chat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "「问候」"}}]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = OpenAiProvider::new(&config).expect("provider");

    let reply = provider
        .test_connection("deepseek-chat")
        .await
        .expect("connection test failed");
    assert_eq!(reply, "连接成功");

    let title = provider
        .generate_title(
            &[deepchat::Turn::user("你好"), deepchat::Turn::assistant("你好！")],
            "deepseek-reasoner",
        )
        .await
        .expect("title generation failed");
    assert_eq!(title.as_deref(), Some("「问候」"));
}
