//! Demo traffic matching the reference publisher

use contracts::{Message, DEMO_EVENT_TYPE};
use serde_json::json;

/// One demo message: `{"counter": n, "text": "hello from publisher"}`
pub fn demo_message(source: &str, counter: u64) -> Message {
    Message::new(
        DEMO_EVENT_TYPE,
        source,
        json!({
            "counter": counter,
            "text": "hello from publisher",
        }),
    )
}

/// Demo messages with counters `1..=count`
pub fn demo_messages(source: &str, count: u64) -> Vec<Message> {
    (1..=count).map(|i| demo_message(source, i)).collect()
}
