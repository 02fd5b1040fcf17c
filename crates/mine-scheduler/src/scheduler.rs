//! Mine scheduler service
//!
//! Owns the single event loop that decides when this node should ask
//! the block assembler for a new block. The loop is the only writer of
//! timer state; everything reaching it from other tasks travels over
//! channels, so no scheduling state needs a lock. The one piece of
//! shared state is the tri-state enabled flag, mutated with
//! compare-and-swap so concurrent start/stop calls stay race-free.

use crate::{
    config::MinerConfig,
    domain::{sleep_time, Address, Block, WindowParams},
    error::{MinerError, Result},
    metrics::Metrics,
    ports::{
        BlockAssembler, ChainView, MineControl, ProduceRequest, RotationResolver, StartStatus,
        StopStatus,
    },
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc, RwLock,
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

/// Not attempting to produce blocks
const STATE_DISABLED: u8 = 0;
/// Scheduling production; the event loop is running
const STATE_ENABLED: u8 = 1;
/// Terminal state after close
const STATE_CLOSED: u8 = 2;

/// Control messages delivered to the event loop
enum Control {
    Stop,
    Close,
}

/// Handle to a running event loop
struct LoopHandle {
    control: mpsc::Sender<Control>,
    task: JoinHandle<()>,
}

/// Block production scheduler for a deputy-rotation chain
///
/// Constructed once at node startup bound to its collaborators, started
/// and stopped any number of times, closed exactly once at shutdown.
pub struct MineScheduler {
    config: MinerConfig,
    chain: Arc<dyn ChainView>,
    resolver: Arc<dyn RotationResolver>,
    assembler: Arc<dyn BlockAssembler>,

    /// Tri-state enabled flag, the only field mutated from outside the
    /// event loop. Transitions only via compare-and-swap.
    state: Arc<AtomicU8>,

    /// Whether the last scheduling round found this node in the deputy
    /// set for the next height. Maintained by the loop.
    deputy: Arc<AtomicBool>,

    /// Candidate address used in the next scheduling round
    miner_address: Arc<RwLock<Address>>,

    metrics: Arc<Metrics>,

    /// Serializes start/stop/close; `None` while no loop is running
    runtime: tokio::sync::Mutex<Option<LoopHandle>>,
}

impl MineScheduler {
    /// Create a new scheduler bound to its external collaborators
    pub fn new(
        config: MinerConfig,
        miner_address: Address,
        chain: Arc<dyn ChainView>,
        resolver: Arc<dyn RotationResolver>,
        assembler: Arc<dyn BlockAssembler>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "[miner] scheduler created: block interval {} ms, slot timeout {} ms, miner 0x{}",
            config.block_interval_ms,
            config.timeout_ms,
            hex::encode(miner_address)
        );

        Ok(Self {
            config,
            chain,
            resolver,
            assembler,
            state: Arc::new(AtomicU8::new(STATE_DISABLED)),
            deputy: Arc::new(AtomicBool::new(false)),
            miner_address: Arc::new(RwLock::new(miner_address)),
            metrics: Arc::new(Metrics::new()),
            runtime: tokio::sync::Mutex::new(None),
        })
    }

    /// Get the scheduling metrics
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Get the scheduler configuration
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }
}

#[async_trait]
impl MineControl for MineScheduler {
    async fn start(&self) -> Result<StartStatus> {
        let mut runtime = self.runtime.lock().await;

        match self.state.compare_exchange(
            STATE_DISABLED,
            STATE_ENABLED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {}
            Err(STATE_CLOSED) => return Err(MinerError::Closed),
            Err(_) => {
                warn!("[miner] start requested but scheduler is already running");
                return Ok(StartStatus::AlreadyRunning);
            }
        }

        // A scheduling round racing an earlier stop may have left the
        // deputy indicator set; it must not leak into the new run.
        self.deputy.store(false, Ordering::SeqCst);

        // The only fatal path: without a head there is nothing to
        // schedule against, and the caller asked for mining explicitly.
        let head = match self.chain.current_head().await {
            Ok(head) => head,
            Err(e) => {
                self.state.store(STATE_DISABLED, Ordering::SeqCst);
                error!("[miner] cannot start, head unavailable: {}", e);
                return Err(e);
            }
        };

        // Subscribe before the first scheduling round so a deputy-set
        // change arriving right after start is never missed.
        let blocks = self.chain.subscribe_new_blocks();
        let (control_tx, control_rx) = mpsc::channel(1);

        let event_loop = EventLoop {
            config: self.config.clone(),
            chain: Arc::clone(&self.chain),
            resolver: Arc::clone(&self.resolver),
            assembler: Arc::clone(&self.assembler),
            deputy: Arc::clone(&self.deputy),
            miner_address: Arc::clone(&self.miner_address),
            metrics: Arc::clone(&self.metrics),
            blocks,
            control: control_rx,
            head,
            window_deadline: None,
            watchdog_deadline: None,
        };
        let task = tokio::spawn(event_loop.run());
        *runtime = Some(LoopHandle {
            control: control_tx,
            task,
        });

        info!("[miner] scheduler started");
        Ok(StartStatus::Started)
    }

    async fn stop(&self) -> StopStatus {
        let mut runtime = self.runtime.lock().await;

        if self
            .state
            .compare_exchange(
                STATE_ENABLED,
                STATE_DISABLED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            warn!("[miner] stop requested but scheduler is not running");
            return StopStatus::AlreadyStopped;
        }

        self.deputy.store(false, Ordering::SeqCst);

        // Await loop exit so all timers are provably disarmed and the
        // new-block subscription dropped before returning.
        if let Some(handle) = runtime.take() {
            let _ = handle.control.send(Control::Stop).await;
            let _ = handle.task.await;
        }

        info!("[miner] scheduler stopped");
        StopStatus::Stopped
    }

    async fn close(&self) {
        let mut runtime = self.runtime.lock().await;

        if self.state.swap(STATE_CLOSED, Ordering::SeqCst) == STATE_CLOSED {
            debug!("[miner] close requested more than once");
            return;
        }

        self.deputy.store(false, Ordering::SeqCst);

        if let Some(handle) = runtime.take() {
            let _ = handle.control.send(Control::Close).await;
            let _ = handle.task.await;
        }

        info!("[miner] scheduler closed");
    }

    fn is_mining(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_ENABLED && self.deputy.load(Ordering::SeqCst)
    }

    fn set_miner_address(&self, address: Address) {
        *self.miner_address.write().unwrap() = address;
    }

    fn miner_address(&self) -> Address {
        *self.miner_address.read().unwrap()
    }
}

/// Everything observed by the event loop in one iteration
enum LoopEvent {
    WindowFired,
    WatchdogFired,
    NewBlock(Block),
    Lagged,
    FeedClosed,
    Control(Option<Control>),
}

/// State owned exclusively by the event loop task
struct EventLoop {
    config: MinerConfig,
    chain: Arc<dyn ChainView>,
    resolver: Arc<dyn RotationResolver>,
    assembler: Arc<dyn BlockAssembler>,
    deputy: Arc<AtomicBool>,
    miner_address: Arc<RwLock<Address>>,
    metrics: Arc<Metrics>,

    blocks: broadcast::Receiver<Block>,
    control: mpsc::Receiver<Control>,

    /// Head the current schedule was computed against
    head: Block,

    /// Armed "time to produce" timer
    window_deadline: Option<Instant>,

    /// Armed watchdog awaiting confirmation of a production request
    watchdog_deadline: Option<Instant>,
}

impl EventLoop {
    async fn run(mut self) {
        self.reschedule().await;

        loop {
            let window = self.window_deadline;
            let watchdog = self.watchdog_deadline;

            let event = tokio::select! {
                _ = maybe_sleep(window) => LoopEvent::WindowFired,
                _ = maybe_sleep(watchdog) => LoopEvent::WatchdogFired,
                received = self.blocks.recv() => match received {
                    Ok(block) => LoopEvent::NewBlock(block),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("[miner] lagged {} blocks behind the feed, resyncing", missed);
                        LoopEvent::Lagged
                    }
                    Err(broadcast::error::RecvError::Closed) => LoopEvent::FeedClosed,
                },
                command = self.control.recv() => LoopEvent::Control(command),
            };

            match event {
                LoopEvent::WindowFired => self.request_production(),
                LoopEvent::WatchdogFired => {
                    self.watchdog_deadline = None;
                    self.metrics.record_watchdog_retry();
                    debug!(
                        "[miner] no block within {} ms of the production request, rescheduling",
                        self.config.timeout_ms
                    );
                    self.reschedule().await;
                }
                LoopEvent::NewBlock(block) => {
                    // The single re-synchronization point: self-produced
                    // and peer-received blocks take the same path.
                    self.window_deadline = None;
                    self.watchdog_deadline = None;
                    self.metrics.record_head_reschedule();
                    debug!("[miner] new head at height {}", block.height);
                    self.head = block;
                    self.reschedule().await;
                }
                LoopEvent::Lagged => {
                    self.window_deadline = None;
                    self.watchdog_deadline = None;
                    match self.chain.current_head().await {
                        Ok(head) => {
                            self.head = head;
                            self.reschedule().await;
                        }
                        Err(e) => warn!("[miner] head unavailable after lag: {}", e),
                    }
                }
                LoopEvent::FeedClosed => {
                    error!("[miner] new-block feed closed, scheduler loop exiting");
                    self.deputy.store(false, Ordering::SeqCst);
                    break;
                }
                LoopEvent::Control(command) => {
                    match command {
                        Some(Control::Close) => debug!("[miner] scheduler loop closing"),
                        Some(Control::Stop) | None => debug!("[miner] scheduler loop stopping"),
                    }
                    break;
                }
            }
        }
    }

    /// Recompute the schedule against the current head and arm the
    /// window timer; suppressed (dormant until the next head) when the
    /// node is not a deputy at the next height
    async fn reschedule(&mut self) {
        let candidate = *self.miner_address.read().unwrap();
        let mine_height = self.head.next_height();

        let distance = match self
            .resolver
            .distance_of(mine_height, self.head.producer, candidate)
            .await
        {
            Ok(distance) => distance,
            Err(e) => {
                self.deputy.store(false, Ordering::SeqCst);
                self.metrics.record_non_deputy_round();
                self.window_deadline = None;
                debug!("[miner] scheduling suppressed: {}", e);
                return;
            }
        };
        let node_count = self.resolver.deputy_count(mine_height).await.max(1);
        self.deputy.store(true, Ordering::SeqCst);

        let wait = sleep_time(&WindowParams {
            node_count,
            timeout_ms: self.config.timeout_ms,
            block_interval_ms: self.config.block_interval_ms,
            distance,
            parent_block_time: self.head.timestamp,
            now_ms: now_unix_ms(),
        });
        debug!(
            "[miner] distance {} of {} deputies at height {}, window opens in {} ms",
            distance, node_count, mine_height, wait
        );
        self.window_deadline = Some(Instant::now() + Duration::from_millis(wait));
    }

    /// Hand a production request to the assembler and arm the watchdog
    ///
    /// Fire-and-forget: the outcome comes back, if at all, as a new
    /// block on the subscription feed.
    fn request_production(&mut self) {
        self.window_deadline = None;

        let request = ProduceRequest {
            extra_data: self.config.extra_data.clone(),
            time_budget_ms: self.config.produce_budget_ms(),
        };
        info!(
            "[miner] window open, requesting block production at height {}",
            self.head.next_height()
        );
        self.metrics.record_block_requested();

        let assembler = Arc::clone(&self.assembler);
        tokio::spawn(async move {
            assembler.request_block(request).await;
        });

        self.watchdog_deadline = Some(Instant::now() + Duration::from_millis(self.config.timeout_ms));
    }
}

/// Sleep until the deadline, or forever when no timer is armed
async fn maybe_sleep(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Current wall clock in Unix epoch milliseconds
fn now_unix_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
