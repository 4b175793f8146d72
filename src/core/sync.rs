use crate::core::store::SharedStore;
use crate::domain::conflict::{ConflictPolicy, RemoteWins};
use crate::domain::model::Quote;
use crate::domain::ports::{Clock, KeyValueStore, RemoteQuoteSource, Renderer, SystemClock};
use crate::utils::error::{QuoteError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// 單次合併的統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub fetched: usize,
    pub added: usize,
    pub conflicts: usize,
    pub overwritten: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.overwritten > 0
    }
}

/// 以文字完全相同比對遠端與本地名言。
///
/// 找不到對應的遠端名言附加在最後（彼此不去重）；
/// 文字相同但分類不同視為衝突，交給 `policy` 決定並原地覆寫。
pub fn reconcile(
    local: &mut Vec<Quote>,
    remote: Vec<Quote>,
    policy: &dyn ConflictPolicy,
) -> ReconcileReport {
    let mut report = ReconcileReport {
        fetched: remote.len(),
        ..Default::default()
    };
    let mut additions = Vec::new();

    for remote_quote in remote {
        match local.iter().position(|q| q.text == remote_quote.text) {
            None => additions.push(remote_quote),
            Some(index) => {
                if local[index].category == remote_quote.category {
                    continue;
                }

                report.conflicts += 1;
                let resolved = policy.resolve(&local[index], &remote_quote);
                if resolved != local[index] {
                    local[index] = resolved;
                    report.overwritten += 1;
                }
            }
        }
    }

    report.added = additions.len();
    local.extend(additions);
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// 上一輪尚未完成，本輪略過
    Skipped,
    Completed(ReconcileReport),
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 同步引擎：抓取遠端清單並合併進共享的名言集合
pub struct SyncEngine<S: KeyValueStore> {
    store: SharedStore<S>,
    source: Arc<dyn RemoteQuoteSource>,
    renderer: Arc<dyn Renderer>,
    policy: Arc<dyn ConflictPolicy>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl<S: KeyValueStore> SyncEngine<S> {
    pub fn new(
        store: SharedStore<S>,
        source: Arc<dyn RemoteQuoteSource>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            store,
            source,
            renderer,
            policy: Arc::new(RemoteWins),
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_FETCH_TIMEOUT,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn ConflictPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 有逾時限制的遠端抓取，錯誤原樣回傳
    pub async fn try_fetch_remote(&self) -> Result<Vec<Quote>> {
        match tokio::time::timeout(self.timeout, self.source.fetch_quotes()).await {
            Ok(result) => result,
            Err(_) => Err(QuoteError::TimeoutError {
                millis: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// 失敗時記錄並視為零筆遠端資料
    pub async fn fetch_remote(&self) -> Vec<Quote> {
        match self.try_fetch_remote().await {
            Ok(quotes) => {
                tracing::debug!("Fetched {} remote quotes", quotes.len());
                quotes
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Fetching remote quotes failed, skipping this cycle: {} (retryable: {})",
                    e,
                    e.is_retryable()
                );
                Vec::new()
            }
        }
    }

    /// 執行一輪同步；若已有同步進行中則立即回傳 `Skipped`
    pub async fn sync_once(&self) -> Result<SyncOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync already in flight, skipping");
            return Ok(SyncOutcome::Skipped);
        };

        let remote = self.fetch_remote().await;
        if remote.is_empty() {
            return Ok(SyncOutcome::Completed(ReconcileReport::default()));
        }

        let report = {
            let mut store = self.store.lock().await;
            let report = store.merge_remote(remote, self.policy.as_ref()).await?;
            store.record_sync(self.clock.now()).await?;
            report
        };

        tracing::info!(
            "🔄 Sync merged {} remote quotes: {} added, {} conflicts, {} overwritten",
            report.fetched,
            report.added,
            report.conflicts,
            report.overwritten
        );

        if report.added > 0 {
            self.renderer.notify(&format!(
                "Quotes synced with server! {} new quote(s) added.",
                report.added
            ));
        }

        Ok(SyncOutcome::Completed(report))
    }

    /// 背景使用：錯誤只記錄，不往外拋
    pub async fn run_cycle(&self) {
        match self.sync_once().await {
            Ok(SyncOutcome::Skipped) => {}
            Ok(SyncOutcome::Completed(report)) => {
                tracing::debug!("Sync cycle finished: {:?}", report);
            }
            Err(e) => {
                tracing::warn!("⚠️ Sync cycle failed: {}", e);
            }
        }
    }

    /// 新增名言後送到伺服器，結果只記錄
    pub async fn publish(&self, quote: &Quote) {
        match tokio::time::timeout(self.timeout, self.source.publish(quote)).await {
            Ok(Ok(())) => tracing::debug!("Published quote to server"),
            Ok(Err(e)) => tracing::warn!("⚠️ Publishing quote failed: {}", e),
            Err(_) => tracing::warn!("⚠️ Publishing quote timed out"),
        }
    }
}

/// 執行中的週期同步，`stop` 後結束
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SyncHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 通知停止並等待目前這一輪結束
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("⚠️ Sync task ended abnormally: {}", e);
        }
        tracing::info!("⏹️ Periodic sync stopped");
    }
}

pub struct SyncTask;

impl SyncTask {
    /// 立即執行一輪，之後每 `interval` 一輪；落後的 tick 直接略過
    pub fn start<S>(engine: Arc<SyncEngine<S>>, interval: Duration) -> SyncHandle
    where
        S: KeyValueStore + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        tracing::info!("▶️ Periodic sync started (every {:?})", interval);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    // 收到停止訊號或 handle 被丟棄
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        engine.run_cycle().await;
                    }
                }
            }
        });

        SyncHandle { shutdown, handle }
    }
}
