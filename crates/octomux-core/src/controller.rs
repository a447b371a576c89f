// ── Matrix controller ──
//
// Full lifecycle management for the matrix connection: transport
// ownership, connection tracking, health monitoring, and routing
// commands. The controller is the only holder of the HTTP client and of
// the health-task lifecycle.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use octomux_api::{MatrixDevice, PORT_MAX, PORT_MIN, TlsMode, TransportConfig, switch_command};

use crate::config::MatrixConfig;
use crate::error::CoreError;
use crate::model::{ConnectionState, LinkStatus, MatrixStatus, PortId, PortKind, RouteChange};
use crate::resolve::resolve_port;

// ── MatrixController ────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. One instance exists per process: created
/// at startup, [`start`](Self::start)ed to open the transport and launch
/// the health monitor, and [`stop`](Self::stop)ped at shutdown.
#[derive(Clone)]
pub struct MatrixController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: MatrixConfig,
    /// Swapped atomically so no call ever holds a lock across an await.
    device: ArcSwapOption<MatrixDevice>,
    link: watch::Sender<LinkStatus>,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Default)]
struct Lifecycle {
    running: bool,
    health: Option<HealthTask>,
}

struct HealthTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl MatrixController {
    /// Create a new controller from configuration. Does NOT contact the
    /// device — call [`start()`](Self::start) to open the transport and
    /// begin health monitoring.
    pub fn new(config: MatrixConfig) -> Self {
        let (link, _) = watch::channel(LinkStatus::default());
        Self {
            inner: Arc::new(ControllerInner {
                config,
                device: ArcSwapOption::const_empty(),
                link,
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }

    /// Access the session configuration.
    pub fn config(&self) -> &MatrixConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start the client: open the transport, probe the device once, and
    /// launch the health monitor.
    ///
    /// Starting an already-running client is a no-op. The initial probe
    /// runs before this returns, so the connection state reflects reality
    /// without waiting for the first periodic tick.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.running {
            warn!("matrix client already running");
            return Ok(());
        }

        info!(url = %self.inner.config.base_url, "starting matrix client");

        let transport = TransportConfig {
            tls: if self.inner.config.verify_tls {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            timeout: self.inner.config.timeout,
        };
        let device = MatrixDevice::new(self.inner.config.base_url.clone(), &transport)?;
        self.inner.device.store(Some(Arc::new(device)));

        self.check_health().await;

        let interval = self.inner.config.health_interval;
        if interval.is_zero() {
            debug!("health monitor disabled");
        } else {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(health_monitor(self.clone(), interval, cancel.clone()));
            lifecycle.health = Some(HealthTask { cancel, handle });
        }

        lifecycle.running = true;
        Ok(())
    }

    /// Stop the client: cancel the health monitor and await its
    /// completion, close the transport, and reset the connection state
    /// to [`Disconnected`](ConnectionState::Disconnected).
    ///
    /// Safe to call repeatedly, or before `start()`. In-flight calls
    /// complete or fail naturally; only the background task is cancelled.
    pub async fn stop(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.running {
            info!("stopping matrix client");
        }

        if let Some(task) = lifecycle.health.take() {
            task.cancel.cancel();
            let _ = task.handle.await;
        }

        self.inner.device.store(None);
        self.inner
            .link
            .send_modify(|link| link.state = ConnectionState::Disconnected);
        lifecycle.running = false;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a raw command string to the matrix.
    ///
    /// Every outcome feeds the connection tracker: success records the
    /// timestamp and response body, failure flips the state to `Error`.
    pub async fn send_command(&self, cmd: &str) -> Result<String, CoreError> {
        let device = self.device()?;

        match device.send_command(cmd).await {
            Ok(body) => {
                self.inner.link.send_modify(|link| {
                    link.state = ConnectionState::Connected;
                    link.last_command = Some(Utc::now());
                    link.last_response = Some(body.clone());
                });
                debug!(%cmd, response_len = body.len(), "matrix command succeeded");
                Ok(body)
            }
            Err(err) => {
                self.inner
                    .link
                    .send_modify(|link| link.state = ConnectionState::Error);
                warn!(%cmd, error = %err, "matrix command failed");
                Err(err.into())
            }
        }
    }

    /// Resolve both identifiers and route `input` to `output`.
    ///
    /// Names are fetched live for the resolution; fetch failures fall
    /// back to defaults and never fail the call by themselves.
    pub async fn set_routing(
        &self,
        input: &PortId,
        output: &PortId,
    ) -> Result<RouteChange, CoreError> {
        let input_names = self.input_names().await;
        let output_names = self.output_names().await;
        self.route_resolved(input, output, &input_names, &output_names)
            .await
    }

    /// Routing against caller-supplied name tables, so a batch pays for
    /// one fetch.
    pub(crate) async fn route_resolved(
        &self,
        input: &PortId,
        output: &PortId,
        input_names: &BTreeMap<u8, String>,
        output_names: &BTreeMap<u8, String>,
    ) -> Result<RouteChange, CoreError> {
        let output_num = resolve_port(output, PortKind::Output, output_names)?;
        let input_num = resolve_port(input, PortKind::Input, input_names)?;

        let cmd = switch_command(input_num, output_num)?;
        self.send_command(&cmd).await?;

        Ok(RouteChange {
            output: output_num,
            output_name: display_name(output_names, PortKind::Output, output_num),
            input: input_num,
            input_name: display_name(input_names, PortKind::Input, input_num),
        })
    }

    // ── Name queries ─────────────────────────────────────────────────

    /// Current input names keyed by port, always covering 1-8.
    ///
    /// Falls back to synthesized defaults (`HDMI {n}`) on any fetch or
    /// shape failure; never errors.
    pub async fn input_names(&self) -> BTreeMap<u8, String> {
        self.names(PortKind::Input).await
    }

    /// Current output names keyed by port, always covering 1-8.
    ///
    /// Falls back to synthesized defaults (`Output {n}`) on any fetch or
    /// shape failure; never errors.
    pub async fn output_names(&self) -> BTreeMap<u8, String> {
        self.names(PortKind::Output).await
    }

    async fn names(&self, kind: PortKind) -> BTreeMap<u8, String> {
        let Some(device) = self.inner.device.load_full() else {
            warn!(%kind, "matrix client not initialized; using default names");
            return kind.default_names();
        };

        let fetched = match kind {
            PortKind::Input => device.input_names().await,
            PortKind::Output => device.output_names().await,
        };

        match fetched {
            Ok(list) => {
                // Pad with defaults so the 1-8 domain always holds.
                let mut names = kind.default_names();
                for (index, name) in list.into_iter().enumerate() {
                    let Ok(port) = u8::try_from(index + 1) else {
                        break;
                    };
                    if port > PORT_MAX {
                        break;
                    }
                    if !name.is_empty() {
                        names.insert(port, name);
                    }
                }
                names
            }
            Err(err) => {
                warn!(%kind, error = %err, "name fetch failed; using default names");
                kind.default_names()
            }
        }
    }

    // ── Routing state ────────────────────────────────────────────────

    /// Best-effort routing table: every output 1-8 mapped to its current
    /// input, or `None` where the device gives no answer.
    ///
    /// Firmware support for the status query varies; any error, absent
    /// table, or out-of-range entry degrades to unknown rather than
    /// failing.
    pub async fn routing_state(&self) -> BTreeMap<u8, Option<u8>> {
        let mut table: BTreeMap<u8, Option<u8>> =
            (PORT_MIN..=PORT_MAX).map(|port| (port, None)).collect();

        let Some(device) = self.inner.device.load_full() else {
            warn!("matrix client not initialized; routing state unknown");
            return table;
        };

        match device.video_status().await {
            Ok(Some(vsw)) => {
                for (index, raw) in vsw.into_iter().enumerate() {
                    let Ok(output) = u8::try_from(index + 1) else {
                        break;
                    };
                    if output > PORT_MAX {
                        break;
                    }
                    // vsw entries are 0-indexed input numbers
                    match u8::try_from(raw + 1) {
                        Ok(input) if (PORT_MIN..=PORT_MAX).contains(&input) => {
                            table.insert(output, Some(input));
                        }
                        _ => {}
                    }
                }
            }
            Ok(None) => debug!("matrix exposes no routing table"),
            Err(err) => warn!(error = %err, "routing state query failed"),
        }

        table
    }

    // ── Health ───────────────────────────────────────────────────────

    /// Probe the device once and fold the outcome into the tracker.
    ///
    /// Returns whether the matrix was reachable. Never errors; probe
    /// failures only degrade the tracked state.
    pub async fn check_health(&self) -> bool {
        let Some(device) = self.inner.device.load_full() else {
            self.inner
                .link
                .send_modify(|link| link.state = ConnectionState::Disconnected);
            return false;
        };

        match device.probe().await {
            Ok(()) => {
                self.inner
                    .link
                    .send_modify(|link| link.state = ConnectionState::Connected);
                debug!("matrix health check succeeded");
                true
            }
            Err(err) => {
                self.inner
                    .link
                    .send_modify(|link| link.state = ConnectionState::Error);
                warn!(error = %err, "matrix health check failed");
                false
            }
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to link-status changes.
    pub fn subscribe(&self) -> watch::Receiver<LinkStatus> {
        self.inner.link.subscribe()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.link.borrow().state
    }

    /// Timestamp of the last successful command (health probes do not
    /// count).
    pub fn last_command_time(&self) -> Option<DateTime<Utc>> {
        self.inner.link.borrow().last_command
    }

    /// Last raw response body from the matrix.
    pub fn last_response(&self) -> Option<String> {
        self.inner.link.borrow().last_response.clone()
    }

    /// Consistent snapshot of the full tracker triple.
    pub fn link(&self) -> LinkStatus {
        self.inner.link.borrow().clone()
    }

    /// Aggregate status for the API surface.
    pub fn status(&self) -> MatrixStatus {
        let link = self.link();
        MatrixStatus {
            connection: link.state,
            url: self.inner.config.base_url.to_string(),
            last_command: link.last_command,
            last_response: link.last_response,
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn device(&self) -> Result<Arc<MatrixDevice>, CoreError> {
        self.inner.device.load_full().ok_or(CoreError::NotInitialized)
    }
}

fn display_name(names: &BTreeMap<u8, String>, kind: PortKind, port: u8) -> String {
    names
        .get(&port)
        .cloned()
        .unwrap_or_else(|| kind.default_name(port))
}

// ── Background task ─────────────────────────────────────────────────

/// Periodically probe the device, keeping the tracker fresh while the
/// client is otherwise idle. Probe failures are logged and swallowed;
/// only cancellation ends the loop.
async fn health_monitor(
    controller: MatrixController,
    period: Duration,
    cancel: CancellationToken,
) {
    info!(interval_secs = period.as_secs(), "starting health monitor");

    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                controller.check_health().await;
            }
        }
    }

    debug!("health monitor stopped");
}
