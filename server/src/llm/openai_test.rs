use super::*;
use crate::llm::types::Message;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn parse_tool_call_decodes_arguments() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "emit_seo_keywords", "arguments": "{\"keywords\":\"funk, baile\"}" }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": { "prompt_tokens": 20, "completion_tokens": 10 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "tool_use");
    assert_eq!(resp.tool_input("emit_seo_keywords").unwrap()["keywords"], "funk, baile");
}

#[test]
fn parse_length_finish_reason() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "cut" }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_bad_tool_arguments_errors() {
    let json = serde_json::json!({
        "choices": [{
            "message": {
                "tool_calls": [{ "id": "c", "function": { "name": "emit", "arguments": "{not json" } }]
            }
        }]
    })
    .to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_puts_system_first_and_forces_function() {
    let tools = [Tool { name: "emit".into(), description: "d".into(), input_schema: serde_json::json!({}) }];
    let messages = [Message::user("Title: X")];
    let request = ChatRequest { max_tokens: 64, system: "be brief", messages: &messages, tools: &tools, force_tool: Some("emit") };
    let body = serde_json::to_value(build_request("gpt-4o", &request)).unwrap();
    assert_eq!(body["messages"][0], serde_json::json!({ "role": "system", "content": "be brief" }));
    assert_eq!(body["messages"][1]["content"], "Title: X");
    assert_eq!(body["tools"][0]["function"]["name"], "emit");
    assert_eq!(body["tool_choice"], serde_json::json!({ "type": "function", "function": { "name": "emit" } }));
}

#[test]
fn request_skips_blank_system() {
    let messages = [Message::user("hi")];
    let request = ChatRequest { max_tokens: 8, system: "  ", messages: &messages, tools: &[], force_tool: None };
    let body = serde_json::to_value(build_request("gpt-4o", &request)).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
}
