//! Redis pub/sub transport

use async_trait::async_trait;
use contracts::{ContractError, Message};
use futures::stream::BoxStream;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use tracing::{debug, info, instrument, warn};

use crate::feed::EventFeed;

fn open_client(url: &str) -> Result<redis::Client, ContractError> {
    redis::Client::open(url).map_err(|e| ContractError::feed_connection(url, e.to_string()))
}

/// Subscriber on one broadcast channel
pub struct RedisFeed {
    channel: String,
    messages: BoxStream<'static, redis::Msg>,
}

impl RedisFeed {
    /// Connect and subscribe
    #[instrument(name = "redis_feed_connect", skip(url))]
    pub async fn connect(url: &str, channel: &str) -> Result<Self, ContractError> {
        let client = open_client(url)?;
        let mut pubsub = client
            .get_async_pubsub()
            .await
            .map_err(|e| ContractError::feed_connection(url, e.to_string()))?;
        pubsub
            .subscribe(channel)
            .await
            .map_err(|e| ContractError::feed_connection(url, e.to_string()))?;

        info!(channel = %channel, "subscribed to redis");

        Ok(Self {
            channel: channel.to_string(),
            messages: pubsub.into_on_message().boxed(),
        })
    }
}

#[async_trait]
impl EventFeed for RedisFeed {
    fn name(&self) -> &str {
        "redis"
    }

    async fn next(&mut self) -> Option<Result<Message, ContractError>> {
        let Some(msg) = self.messages.next().await else {
            warn!(channel = %self.channel, "redis subscription closed");
            return None;
        };
        Some(Message::from_json(msg.get_payload_bytes()))
    }
}

/// Publisher with an auto-reconnecting connection
#[derive(Clone)]
pub struct RedisPublisher {
    connection: ConnectionManager,
}

impl RedisPublisher {
    #[instrument(name = "redis_publisher_connect", skip(url))]
    pub async fn connect(url: &str) -> Result<Self, ContractError> {
        let client = open_client(url)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| ContractError::feed_connection(url, e.to_string()))?;

        debug!("redis publisher connected");
        Ok(Self { connection })
    }

    /// Publish an envelope, returning the number of subscribers reached
    pub async fn publish(&self, channel: &str, message: &Message) -> Result<u64, ContractError> {
        let data = message.to_json()?;
        let mut connection = self.connection.clone();

        redis::cmd("PUBLISH")
            .arg(channel)
            .arg(data)
            .query_async::<u64>(&mut connection)
            .await
            .map_err(|e| ContractError::publish(channel, e.to_string()))
    }
}
