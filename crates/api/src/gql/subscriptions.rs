use async_graphql::{Context, Result, Subscription};
use futures_util::Stream;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::gql::common::helpers::get_competition;
use crate::gql::error::ResultExt;
use crate::gql::types::ResultRecordedEvent;
use crate::state::AppState;

const CHANNEL_CAPACITY: usize = 100;

/// Per-competition result channels
struct SubscriptionChannels {
    results: HashMap<Uuid, broadcast::Sender<ResultRecordedEvent>>,
}

impl SubscriptionChannels {
    fn new() -> Self {
        Self {
            results: HashMap::new(),
        }
    }

    fn get_or_create_results(
        &mut self,
        competition_id: Uuid,
    ) -> &broadcast::Sender<ResultRecordedEvent> {
        self.results
            .entry(competition_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
    }

    /// Forget the channel once nobody listens to it anymore.
    fn release(&mut self, competition_id: Uuid) {
        if self
            .results
            .get(&competition_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            self.results.remove(&competition_id);
        }
    }
}

static CHANNELS: Lazy<Arc<Mutex<SubscriptionChannels>>> =
    Lazy::new(|| Arc::new(Mutex::new(SubscriptionChannels::new())));

/// Result events for one competition. Dropping the last stream removes the channel.
pub struct ResultStream {
    inner: Option<BroadcastStream<ResultRecordedEvent>>,
    competition_id: Uuid,
}

impl Stream for ResultStream {
    type Item = Result<ResultRecordedEvent, BroadcastStreamRecvError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            Some(inner) => Pin::new(inner).poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for ResultStream {
    fn drop(&mut self) {
        drop(self.inner.take());
        CHANNELS.lock().release(self.competition_id);
    }
}

fn subscribe_results(competition_id: Uuid) -> ResultStream {
    let receiver = CHANNELS
        .lock()
        .get_or_create_results(competition_id)
        .subscribe();
    ResultStream {
        inner: Some(BroadcastStream::new(receiver)),
        competition_id,
    }
}

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Run times recorded or cleared for a competition
    async fn result_recorded(
        &self,
        ctx: &Context<'_>,
        competition_id: async_graphql::ID,
    ) -> Result<ResultStream> {
        let competition_uuid =
            Uuid::parse_str(competition_id.as_str()).gql_err("Invalid competition ID")?;
        let state = ctx.data::<AppState>()?;
        get_competition(&state.db, competition_uuid).await?;

        Ok(subscribe_results(competition_uuid))
    }
}

/// Publish a recorded result to the competition's channel, if anyone listens
pub fn publish_result_recorded(event: ResultRecordedEvent) {
    let competition_id = match Uuid::parse_str(event.competition_id.as_str()) {
        Ok(id) => id,
        Err(_) => return,
    };

    let mut channels = CHANNELS.lock();
    let Some(sender) = channels.results.get(&competition_id) else {
        return;
    };
    if sender.send(event).is_err() {
        channels.release(competition_id);
    }
}
