//! Wire-format tests for the Anthropic request factory
//!
//! These tests check the JSON body produced for the Messages API, through
//! the public `factory_for` selection path.

use std::sync::Arc;

use relay_models::completions::{ProviderSettings, RequestFactory, ServiceType, factory_for};
use relay_models::{ChatTurnParameters, ConversationMessage};
use serde_json::{Value, json};

fn claude() -> Box<dyn RequestFactory> {
    factory_for(
        ServiceType::Anthropic,
        &ProviderSettings::default(),
        Arc::new("You are a coding assistant."),
    )
    .unwrap()
}

fn body(factory: &dyn RequestFactory, params: &ChatTurnParameters) -> Value {
    let json = factory.create_chat_request(params).unwrap().to_json().unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn chat_request_body_matches_messages_api() {
    let params = ChatTurnParameters::new("And in Rust?").history(vec![
        ConversationMessage::answered("How do I sort a list in Python?", "Use sorted()."),
        ConversationMessage::new("Still thinking"),
    ]);

    let value = body(claude().as_ref(), &params);

    assert_eq!(
        value,
        json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 8192,
            "system": "You are a coding assistant.",
            "stream": true,
            "messages": [
                {"role": "user", "content": "How do I sort a list in Python?"},
                {"role": "assistant", "content": "Use sorted()."},
                {"role": "user", "content": "And in Rust?"}
            ]
        })
    );
}

#[test]
fn image_turn_body_has_base64_image_then_text() {
    let params = ChatTurnParameters::new("What is in this screenshot?")
        .image("image/png", b"\x89PNG".to_vec());

    let value = body(claude().as_ref(), &params);

    assert_eq!(
        value["messages"],
        json!([{
            "role": "user",
            "content": [
                {
                    "type": "image",
                    "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw=="}
                },
                {"type": "text", "text": "What is in this screenshot?"}
            ]
        }])
    );
}

#[test]
fn basic_completion_body_has_one_user_message() {
    let request = claude()
        .create_basic_completion_request("Write a commit message.", "diff --git a b", 512, false)
        .unwrap();
    let value: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

    assert_eq!(
        value,
        json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 512,
            "system": "Write a commit message.",
            "stream": false,
            "messages": [{"role": "user", "content": "diff --git a b"}]
        })
    );
}
