//! EventFeed trait and the submit loop

use async_trait::async_trait;
use contracts::{CancellationToken, ContractError, Message};
use observability::record_feed_invalid;
use processor::{Processor, ProcessorError};
use tracing::{debug, error, info, instrument, warn};

/// Source of decoded messages
#[async_trait]
pub trait EventFeed: Send {
    /// Feed name (used for logging)
    fn name(&self) -> &str;

    /// Next frame
    ///
    /// `None` means the feed has ended. `Some(Err(_))` is a frame that
    /// could not be decoded; the feed itself remains usable.
    async fn next(&mut self) -> Option<Result<Message, ContractError>>;
}

/// Counters from one `run_feed` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Frames pulled from the feed, valid or not
    pub received: u64,
    /// Messages accepted by the processor
    pub submitted: u64,
    /// Messages dropped because the queue was full
    pub rejected: u64,
    /// Frames that failed to decode
    pub invalid: u64,
}

/// Pump a feed into the processor
///
/// Runs until the feed ends, `shutdown` fires, or the processor stops
/// accepting. Full-queue rejections are counted and skipped.
#[instrument(name = "feed_run", skip_all, fields(feed = %feed.name()))]
pub async fn run_feed<F>(feed: &mut F, processor: &Processor, shutdown: &CancellationToken) -> FeedStats
where
    F: EventFeed + ?Sized,
{
    let mut stats = FeedStats::default();

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("feed shutdown requested");
                break;
            }
            next = feed.next() => next,
        };

        let Some(frame) = next else {
            info!("feed ended");
            break;
        };
        stats.received += 1;

        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                stats.invalid += 1;
                record_feed_invalid();
                error!(error = %e, "invalid message");
                continue;
            }
        };

        let event_id = message.id.clone();
        match processor.submit(message) {
            Ok(()) => {
                stats.submitted += 1;
                debug!(event_id = %event_id, "message submitted");
            }
            Err(ProcessorError::QueueFull) => {
                stats.rejected += 1;
            }
            Err(ProcessorError::NotAccepting) => {
                warn!(event_id = %event_id, "processor not accepting, stopping feed");
                break;
            }
        }
    }

    info!(
        received = stats.received,
        submitted = stats.submitted,
        rejected = stats.rejected,
        invalid = stats.invalid,
        "feed stopped"
    );
    stats
}
