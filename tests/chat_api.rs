mod common;

use common::{ChatReply, MockUpstream, TEST_KEY};
use doc_chat::answer::AnswerFetcher;
use doc_chat::config::LlmConfig;
use doc_chat::llm::{ChatError, ChatModel, OpenAiChat};
use doc_chat::prompt::SYSTEM_INSTRUCTION;
use std::sync::Arc;

fn llm_config(upstream: &MockUpstream) -> LlmConfig {
    LlmConfig {
        base_url: upstream.chat_base_url(),
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn sends_model_messages_and_bearer_key() {
    let upstream = MockUpstream::start(ChatReply::Answer("Grounded answer.".to_string())).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), Some(TEST_KEY.to_string()));
    let fetcher = AnswerFetcher::new(Arc::new(chat));

    let context = vec!["Doc1 text.".to_string(), "Doc2 text.".to_string()];
    let answer = fetcher
        .get_answer("What is the summary of this document?", &context)
        .await
        .unwrap();
    assert_eq!(answer, "Grounded answer.");

    let requests = upstream.chat_requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0];
    assert_eq!(body["model"], "gpt-3.5-turbo");

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], SYSTEM_INSTRUCTION);
    assert_eq!(messages[1]["role"], "user");
    assert!(messages[1]["content"]
        .as_str()
        .unwrap()
        .ends_with("Doc1 text. Doc2 text."));

    assert_eq!(
        upstream.auth_headers(),
        vec![Some(format!("Bearer {}", TEST_KEY))]
    );
}

#[tokio::test]
async fn answer_text_is_passed_through_unmodified() {
    let raw = "  Paragraph one.\n\nParagraph <two> & \"three\".  ";
    let upstream = MockUpstream::start(ChatReply::Answer(raw.to_string())).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), Some(TEST_KEY.to_string()));

    let answer = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap();
    assert_eq!(answer, raw);
}

#[tokio::test]
async fn rejected_key_is_an_authentication_error() {
    let upstream =
        MockUpstream::start(ChatReply::Status(401, "Incorrect API key provided".to_string())).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), Some("sk-wrong".to_string()));

    let err = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap_err();
    match err {
        ChatError::Authentication(message) => {
            assert!(message.contains("Incorrect API key provided"))
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_key_never_reaches_the_endpoint() {
    let upstream = MockUpstream::start(ChatReply::Answer("unused".to_string())).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), None);

    let err = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Authentication(_)));
    assert!(upstream.chat_requests().is_empty());
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let upstream = MockUpstream::start(ChatReply::Status(503, "overloaded".to_string())).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), Some(TEST_KEY.to_string()));

    let err = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap_err();
    match err {
        ChatError::Api { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
    // No retry.
    assert_eq!(upstream.chat_requests().len(), 1);
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let upstream = MockUpstream::start(ChatReply::NoChoices).await;
    let chat = OpenAiChat::new(&llm_config(&upstream), Some(TEST_KEY.to_string()));

    let err = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::EmptyResponse));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = LlmConfig {
        base_url: format!("http://{}/v1", addr),
        ..LlmConfig::default()
    };
    let chat = OpenAiChat::new(&config, Some(TEST_KEY.to_string()));

    let err = chat
        .complete(&doc_chat::prompt::build_prompt("Q?", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Transport(_)));
}
