//! Gateway frames used across scenarios

use serde_json::{json, Value};

use crate::helpers::BOT_ID;

/// Successful handshake
pub fn hello(session_id: &str) -> Value {
    json!({"s": 1, "d": {"code": 0, "session_id": session_id}})
}

/// Rejected handshake
pub fn hello_failure(code: i64) -> Value {
    json!({"s": 1, "d": {"code": code}})
}

/// Heartbeat acknowledgement
pub fn pong() -> Value {
    json!({"s": 3})
}

/// Server-initiated reconnect
pub fn reconnect() -> Value {
    json!({"s": 5, "d": {"code": 41008, "err": "Missing params"}})
}

/// Resume acknowledgement
pub fn resume_ack(session_id: &str) -> Value {
    json!({"s": 6, "d": {"session_id": session_id}})
}

/// Channel message that mentions the bot
pub fn mention_event(sn: u64, content: &str) -> Value {
    json!({
        "s": 0,
        "sn": sn,
        "d": {
            "type": 9,
            "channel_type": "GROUP",
            "target_id": "chan-1",
            "author_id": "user-7",
            "content": content,
            "msg_id": format!("msg-{sn}"),
            "msg_timestamp": 1_700_000_000_000_i64 + sn as i64,
            "extra": {
                "mention": [BOT_ID],
                "author": {"username": "alice", "nickname": "Alice"}
            }
        }
    })
}

/// Channel message that does not mention the bot
pub fn chatter_event(sn: u64) -> Value {
    let mut event = mention_event(sn, "just chatting");
    event["d"]["extra"]["mention"] = json!([]);
    event
}
