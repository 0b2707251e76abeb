use super::*;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "tool_use",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

fn emit_tool() -> Tool {
    Tool {
        name: "emit_lyric_snippet".into(),
        description: "Return the snippet.".into(),
        input_schema: serde_json::json!({ "type": "object" }),
    }
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([{ "type": "text", "text": "Hello world" }]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello world"));
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "tool_use");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_tool_use_response() {
    let json = make_response(serde_json::json!([
        { "type": "tool_use", "id": "tu_1", "name": "emit_lyric_snippet", "input": { "snippet": "Luar do sertão" } }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.tool_input("emit_lyric_snippet").unwrap()["snippet"], "Luar do sertão");
}

#[test]
fn parse_drops_thinking_and_unknown_blocks() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "some_future_type", "data": {} },
        { "type": "text", "text": "Here is my answer" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Here is my answer"));
}

#[test]
fn parse_null_stop_reason() {
    let json = serde_json::json!({
        "content": [],
        "model": "m",
        "stop_reason": null,
        "usage": { "input_tokens": 1, "output_tokens": 2 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "");
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn request_forces_named_tool() {
    let tools = [emit_tool()];
    let messages = [Message::user("Genre: Funk")];
    let request = ChatRequest {
        max_tokens: 256,
        system: "sys",
        messages: &messages,
        tools: &tools,
        force_tool: Some("emit_lyric_snippet"),
    };
    let body = serde_json::to_value(build_request("claude", &request)).unwrap();
    assert_eq!(body["model"], "claude");
    assert_eq!(body["max_tokens"], 256);
    assert_eq!(body["system"], "sys");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["tools"][0]["name"], "emit_lyric_snippet");
    assert_eq!(body["tool_choice"], serde_json::json!({ "type": "tool", "name": "emit_lyric_snippet" }));
}

#[test]
fn request_without_tools_omits_tool_fields() {
    let messages = [Message::user("hi")];
    let request = ChatRequest { max_tokens: 10, system: "", messages: &messages, tools: &[], force_tool: None };
    let body = serde_json::to_value(build_request("claude", &request)).unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
}
