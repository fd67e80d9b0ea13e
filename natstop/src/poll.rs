//! Background poller: fetches both endpoints every interval, derives rates and
//! hands the newest sample to the dashboard through a single-slot channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::error::Result;
use crate::fetch::{StatsFetcher, Transport};
use crate::rates::{rate, RateSample};
use crate::sort::SortKey;
use crate::types::{Counters, Snapshot};

/// One published poll result.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub seq: u64,
    pub snapshot: Snapshot,
    pub rates: RateSample,
}

pub type SampleReceiver = watch::Receiver<Option<Arc<Sample>>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollState {
    Priming,
    Steady { prev: Counters, at: Instant },
}

impl PollState {
    /// Records `curr` as the new baseline and returns the rates since the previous one.
    pub fn advance(&mut self, curr: Counters, now: Instant) -> RateSample {
        let rates = match *self {
            PollState::Priming => RateSample::ZERO,
            PollState::Steady { prev, at } => rate(&prev, &curr, now.saturating_duration_since(at)),
        };
        *self = PollState::Steady { prev: curr, at: now };
        rates
    }
}

pub struct PollLoop<T> {
    fetcher: StatsFetcher<T>,
    interval: Duration,
    sort: watch::Receiver<SortKey>,
    out: watch::Sender<Option<Arc<Sample>>>,
    state: PollState,
    seq: u64,
}

impl<T: Transport + 'static> PollLoop<T> {
    pub fn new(
        fetcher: StatsFetcher<T>,
        interval: Duration,
        sort: watch::Receiver<SortKey>,
    ) -> (Self, SampleReceiver) {
        let (out, rx) = watch::channel(None);
        let poller = Self {
            fetcher,
            interval,
            sort,
            out,
            state: PollState::Priming,
            seq: 0,
        };
        (poller, rx)
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Fetches both fragments concurrently, then computes and publishes one sample.
    pub async fn cycle(&mut self) -> Result<Arc<Sample>> {
        let sort = *self.sort.borrow_and_update();
        let (server, connections) = tokio::try_join!(
            self.fetcher.server_stats(),
            self.fetcher.connections(sort)
        )?;
        let rates = self.state.advance(server.counters(), Instant::now());
        self.seq += 1;
        let sample = Arc::new(Sample {
            seq: self.seq,
            snapshot: Snapshot {
                server,
                connections,
            },
            rates,
        });
        debug!(
            seq = sample.seq,
            conns = sample.snapshot.connections.num_connections,
            in_msgs_per_sec = rates.in_msgs_per_sec,
            out_msgs_per_sec = rates.out_msgs_per_sec,
            "poll cycle"
        );
        self.out.send_replace(Some(sample.clone()));
        Ok(sample)
    }

    /// Polls until a fetch fails for good or the dashboard goes away.
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.cycle().await?;
            if self.out.is_closed() {
                info!("dashboard gone, stopping poller");
                return Ok(());
            }
            sleep(self.interval).await;
        }
    }

    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}
