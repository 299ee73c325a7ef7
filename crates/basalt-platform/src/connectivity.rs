//! Network reachability by periodically opening a TCP connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use basalt_core::ports::ConnectivityPort;
use basalt_core::LifecycleEvent;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct TcpConnectivityMonitor {
    addr: String,
    timeout: Duration,
    interval: Duration,
    connected: AtomicBool,
}

impl TcpConnectivityMonitor {
    /// Starts optimistic; call [`TcpConnectivityMonitor::refresh`] for a real reading.
    pub fn new(host: &str, port: u16, timeout: Duration, interval: Duration) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            timeout,
            interval,
            connected: AtomicBool::new(true),
        }
    }

    async fn check_once(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await,
            Ok(Ok(_))
        )
    }

    /// Checks now and stores the result. Returns the previous reading.
    pub async fn refresh(&self) -> bool {
        let now = self.check_once().await;
        self.connected.swap(now, Ordering::SeqCst)
    }

    /// Polls until `shutdown`, emitting `ConnectivityChanged` on every flip.
    pub async fn run(
        self: Arc<Self>,
        events: mpsc::Sender<LifecycleEvent>,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let before = self.refresh().await;
                    let now = self.is_connected();
                    if before == now {
                        continue;
                    }
                    info!(addr = %self.addr, connected = now, "Connectivity changed");
                    if events
                        .send(LifecycleEvent::ConnectivityChanged { connected: now })
                        .await
                        .is_err()
                    {
                        debug!("Event channel closed, stopping connectivity monitor");
                        break;
                    }
                }
            }
        }
    }
}

impl ConnectivityPort for TcpConnectivityMonitor {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
