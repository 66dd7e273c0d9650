//! Mock feed
//!
//! Replays a fixed list of frames; used by tests and `run --mock`.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use contracts::{ContractError, Message};

use crate::feed::EventFeed;

enum Frame {
    Message(Message),
    Raw(Vec<u8>),
}

/// In-memory feed
pub struct MockFeed {
    frames: VecDeque<Frame>,
    interval: Option<Duration>,
}

impl MockFeed {
    /// Feed yielding the given messages in order
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            frames: messages.into_iter().map(Frame::Message).collect(),
            interval: None,
        }
    }

    /// Pause before every frame
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.frames.push_back(Frame::Message(message));
    }

    /// Append raw bytes, decoded when yielded
    pub fn push_raw(&mut self, bytes: Vec<u8>) {
        self.frames.push_back(Frame::Raw(bytes));
    }

    /// Frames not yet yielded
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl EventFeed for MockFeed {
    fn name(&self) -> &str {
        "mock"
    }

    async fn next(&mut self) -> Option<Result<Message, ContractError>> {
        if self.frames.is_empty() {
            return None;
        }
        if let Some(interval) = self.interval {
            tokio::time::sleep(interval).await;
        }

        match self.frames.pop_front()? {
            Frame::Message(message) => Some(Ok(message)),
            Frame::Raw(bytes) => Some(Message::from_json(&bytes)),
        }
    }
}
