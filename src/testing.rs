//! Test doubles for the controller's collaborators.
//!
//! Provides:
//! - [`StubContainerApi`]: scripted envelopes, call counters, and optional
//!   gates that hold a create or remove call in flight
//! - [`RecordingPresenter`]: records everything the controller renders
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use minishell_panel::config::PanelConfig;
//! use minishell_panel::controller::LifecycleController;
//! use minishell_panel::testing::{RecordingPresenter, StubContainerApi};
//!
//! # async fn example() {
//! let api = Arc::new(StubContainerApi::new());
//! let presenter = Arc::new(RecordingPresenter::new());
//! let controller = LifecycleController::new(api.clone(), presenter.clone(), PanelConfig::default());
//! controller.start().await;
//! assert_eq!(api.create_calls(), 1);
//! # }
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{ContainerApi, ContainerLogs, CreatedContainer, ResultEnvelope};
use crate::controller::{LogModal, PanelView, Presenter, TerminalUpdate};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a call open until the test releases it.
#[derive(Default)]
pub struct CallGate {
    entered: Notify,
    release: Notify,
}

impl CallGate {
    /// Wait until the gated call has started.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the gated call return.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// A scripted [`ContainerApi`].
///
/// Every operation succeeds by default: create returns container `c1`, logs
/// return an empty tail.
pub struct StubContainerApi {
    create_result: Mutex<ResultEnvelope<CreatedContainer>>,
    stop_result: Mutex<ResultEnvelope<()>>,
    remove_result: Mutex<ResultEnvelope<()>>,
    logs_result: Mutex<ResultEnvelope<ContainerLogs>>,
    create_gate: Mutex<Option<Arc<CallGate>>>,
    remove_gate: Mutex<Option<Arc<CallGate>>>,
    created_names: Mutex<Vec<String>>,
    log_tails: Mutex<Vec<u32>>,
    create_count: AtomicU32,
    stop_count: AtomicU32,
    remove_count: AtomicU32,
    fetch_count: AtomicU32,
}

impl Default for StubContainerApi {
    fn default() -> Self {
        Self::new()
    }
}

impl StubContainerApi {
    pub fn new() -> Self {
        Self {
            create_result: Mutex::new(ResultEnvelope::ok(CreatedContainer {
                container_id: "c1".to_string(),
                container_name: None,
            })),
            stop_result: Mutex::new(ResultEnvelope::ok(())),
            remove_result: Mutex::new(ResultEnvelope::ok(())),
            logs_result: Mutex::new(ResultEnvelope::ok(ContainerLogs::default())),
            create_gate: Mutex::new(None),
            remove_gate: Mutex::new(None),
            created_names: Mutex::new(Vec::new()),
            log_tails: Mutex::new(Vec::new()),
            create_count: AtomicU32::new(0),
            stop_count: AtomicU32::new(0),
            remove_count: AtomicU32::new(0),
            fetch_count: AtomicU32::new(0),
        }
    }

    pub fn set_create_result(&self, result: ResultEnvelope<CreatedContainer>) {
        *lock(&self.create_result) = result;
    }

    pub fn set_stop_result(&self, result: ResultEnvelope<()>) {
        *lock(&self.stop_result) = result;
    }

    pub fn set_remove_result(&self, result: ResultEnvelope<()>) {
        *lock(&self.remove_result) = result;
    }

    pub fn set_logs_result(&self, result: ResultEnvelope<ContainerLogs>) {
        *lock(&self.logs_result) = result;
    }

    /// Convenience for a successful log tail.
    pub fn set_logs(&self, logs: impl Into<String>) {
        self.set_logs_result(ResultEnvelope::ok(ContainerLogs { logs: logs.into() }));
    }

    /// Make the next create calls block until the returned gate is released.
    pub fn gate_create(&self) -> Arc<CallGate> {
        let gate = Arc::new(CallGate::default());
        *lock(&self.create_gate) = Some(Arc::clone(&gate));
        gate
    }

    /// Make the next remove calls block until the returned gate is released.
    pub fn gate_remove(&self) -> Arc<CallGate> {
        let gate = Arc::new(CallGate::default());
        *lock(&self.remove_gate) = Some(Arc::clone(&gate));
        gate
    }

    pub fn create_calls(&self) -> u32 {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_count.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> u32 {
        self.remove_count.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Container names passed to create, in call order.
    pub fn created_names(&self) -> Vec<String> {
        lock(&self.created_names).clone()
    }

    /// Tail sizes passed to log fetches, in call order.
    pub fn log_tails(&self) -> Vec<u32> {
        lock(&self.log_tails).clone()
    }
}

#[async_trait]
impl ContainerApi for StubContainerApi {
    async fn create_and_run(
        &self,
        name: &str,
        _session_token: &str,
    ) -> ResultEnvelope<CreatedContainer> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.created_names).push(name.to_string());

        let gate = lock(&self.create_gate).clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        lock(&self.create_result).clone()
    }

    async fn stop(&self, _container_id: &str) -> ResultEnvelope<()> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.stop_result).clone()
    }

    async fn remove(&self, _container_id: &str, _force: bool) -> ResultEnvelope<()> {
        self.remove_count.fetch_add(1, Ordering::SeqCst);

        let gate = lock(&self.remove_gate).clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        lock(&self.remove_result).clone()
    }

    async fn fetch_logs(
        &self,
        _container_id: &str,
        tail_lines: u32,
    ) -> ResultEnvelope<ContainerLogs> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.log_tails).push(tail_lines);
        lock(&self.logs_result).clone()
    }
}

/// One call made on a [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Render(PanelView),
    Terminal(TerminalUpdate),
    Modal(LogModal),
    Reset,
}

/// A [`Presenter`] that records every call.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        lock(&self.events).clone()
    }

    pub fn renders(&self) -> Vec<PanelView> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Render(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn last_render(&self) -> Option<PanelView> {
        self.renders().pop()
    }

    pub fn terminal_updates(&self) -> Vec<TerminalUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Terminal(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Plain narration lines appended to the terminal.
    pub fn appended_lines(&self) -> Vec<String> {
        self.terminal_updates()
            .into_iter()
            .filter_map(|u| match u {
                TerminalUpdate::Append(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn modals(&self) -> Vec<LogModal> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Modal(modal) => Some(modal),
                _ => None,
            })
            .collect()
    }

    pub fn reset_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Reset))
            .count()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, view: &PanelView) {
        lock(&self.events).push(PresenterEvent::Render(view.clone()));
    }

    fn terminal(&self, update: TerminalUpdate) {
        lock(&self.events).push(PresenterEvent::Terminal(update));
    }

    fn show_log_modal(&self, modal: LogModal) {
        lock(&self.events).push(PresenterEvent::Modal(modal));
    }

    fn reset_to_placeholder(&self) {
        lock(&self.events).push(PresenterEvent::Reset);
    }
}
