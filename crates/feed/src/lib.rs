//! # Feed
//!
//! The subscription side of the relay and its publish-side counterpart.
//!
//! Responsibilities:
//! - Receive raw envelopes from the broadcast channel and decode them
//! - Submit decoded messages to the `Processor`, tolerating rejection
//! - Publish envelopes (demo publisher)
//!
//! ## Usage
//!
//! ```ignore
//! use feed::{run_feed, RedisFeed};
//!
//! let mut feed = RedisFeed::connect("redis://localhost:6379", "broadcast.events").await?;
//! let stats = run_feed(&mut feed, &processor, &shutdown).await;
//! ```

mod demo;
mod feed;
mod mock;
mod pubsub;

pub use demo::{demo_message, demo_messages};
pub use feed::{run_feed, EventFeed, FeedStats};
pub use mock::MockFeed;
pub use pubsub::{RedisFeed, RedisPublisher};
