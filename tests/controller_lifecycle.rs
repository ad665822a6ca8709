//! Lifecycle controller scenarios.
//!
//! All tests run on a paused tokio clock, so poll intervals and the delayed
//! reset are advanced virtually with `tokio::time::sleep`.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use minishell_panel::api::{CreatedContainer, ResultEnvelope};
use minishell_panel::config::PanelConfig;
use minishell_panel::controller::{
    ButtonGates, ContainerStatus, LifecycleController, LogModal, TerminalUpdate,
};
use minishell_panel::logs::{NO_LOGS_AVAILABLE, WAITING_FOR_LOGS};
use minishell_panel::testing::{RecordingPresenter, StubContainerApi};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Panel {
    api: Arc<StubContainerApi>,
    presenter: Arc<RecordingPresenter>,
    controller: Arc<LifecycleController>,
}

fn panel() -> Panel {
    let api = Arc::new(StubContainerApi::new());
    let presenter = Arc::new(RecordingPresenter::new());
    let controller = Arc::new(LifecycleController::new(
        api.clone(),
        presenter.clone(),
        PanelConfig::default(),
    ));
    Panel {
        api,
        presenter,
        controller,
    }
}

/// Let spawned tasks run without reaching the next poll tick.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// ---------------------------------------------------------------------------
// start()
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn start_on_empty_session_runs_and_fetches_once() {
    let p = panel();

    assert_eq!(p.controller.start().await, ContainerStatus::Running);
    settle().await;

    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.status, ContainerStatus::Running);
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));
    assert!(snapshot.polling);
    assert_eq!(p.api.create_calls(), 1);
    assert_eq!(p.api.fetch_calls(), 1);
    assert_eq!(p.api.log_tails(), vec![20]);

    let names = p.api.created_names();
    assert!(names[0].starts_with("mini_shell_"));
    assert_eq!(names[0].len(), "mini_shell_".len() + 8);

    // Empty tail renders the help text, not a blank pane.
    assert_eq!(
        p.presenter.terminal_updates().last(),
        Some(&TerminalUpdate::Waiting {
            help: WAITING_FOR_LOGS
        })
    );

    let view = p.presenter.last_render().unwrap();
    assert_eq!(view.container_id_prefix.as_deref(), Some("c1"));
    assert_eq!(
        view.buttons,
        ButtonGates {
            start: false,
            stop: true,
            logs: true,
            delete: true
        }
    );
}

#[tokio::test(start_paused = true)]
async fn poller_fetches_every_two_seconds() {
    let p = panel();
    p.controller.start().await;

    tokio::time::sleep(Duration::from_millis(6010)).await;
    // t=0, 2000, 4000, 6000
    assert_eq!(p.api.fetch_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn repeated_start_does_not_add_a_second_poller() {
    let p = panel();
    p.controller.start().await;
    assert_eq!(p.controller.start().await, ContainerStatus::Running);
    assert_eq!(p.controller.start().await, ContainerStatus::Running);

    tokio::time::sleep(Duration::from_millis(4010)).await;
    assert_eq!(p.api.create_calls(), 1);
    assert_eq!(p.api.fetch_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn actions_while_loading_are_ignored() {
    let p = panel();
    let gate = p.api.gate_create();

    let ctl = Arc::clone(&p.controller);
    let pending = tokio::spawn(async move { ctl.start().await });
    gate.wait_entered().await;

    assert_eq!(p.controller.status().await, ContainerStatus::Loading);
    let renders_before = p.presenter.renders().len();

    assert_eq!(p.controller.start().await, ContainerStatus::Loading);
    assert_eq!(p.controller.stop().await, ContainerStatus::Loading);
    assert_eq!(p.controller.delete().await, ContainerStatus::Loading);
    assert_eq!(p.api.create_calls(), 1);
    assert_eq!(p.api.stop_calls(), 0);
    assert_eq!(p.api.remove_calls(), 0);
    assert_eq!(p.presenter.renders().len(), renders_before);

    gate.release();
    assert_eq!(pending.await.unwrap(), ContainerStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn loading_view_disables_every_button() {
    let p = panel();
    let gate = p.api.gate_create();

    let ctl = Arc::clone(&p.controller);
    let pending = tokio::spawn(async move { ctl.start().await });
    gate.wait_entered().await;

    let view = p.presenter.last_render().unwrap();
    assert_eq!(view.status, ContainerStatus::Loading);
    assert_eq!(
        view.buttons,
        ButtonGates {
            start: false,
            stop: false,
            logs: false,
            delete: false
        }
    );

    gate.release();
    pending.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn authentication_failure_returns_to_stopped_with_guidance() {
    let p = panel();
    p.api
        .set_create_result(ResultEnvelope::failure("authentication failed"));

    assert_eq!(p.controller.start().await, ContainerStatus::Stopped);
    settle().await;

    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id, None);
    assert!(!snapshot.polling);
    assert_eq!(p.api.fetch_calls(), 0);

    let lines = p.presenter.appended_lines();
    assert!(lines.contains(&"Error: authentication failed".to_string()));
    assert!(
        lines.iter().any(|l| l.starts_with("Authentication error")),
        "expected authentication guidance in {:?}",
        lines
    );
}

#[tokio::test(start_paused = true)]
async fn unclassified_failure_surfaces_raw_message_only() {
    let p = panel();
    p.api
        .set_create_result(ResultEnvelope::failure("port is already allocated"));

    p.controller.start().await;

    assert_eq!(
        p.presenter.appended_lines(),
        vec!["Error: port is already allocated".to_string()]
    );
    let view = p.presenter.last_render().unwrap();
    assert_eq!(view.status, ContainerStatus::Stopped);
    assert!(view.buttons.start);
}

#[tokio::test(start_paused = true)]
async fn start_reuses_container_name_after_stop() {
    let p = panel();
    p.controller.start().await;
    p.controller.stop().await;

    p.api.set_create_result(ResultEnvelope::ok(CreatedContainer {
        container_id: "c1".to_string(),
        container_name: None,
    }));
    assert_eq!(p.controller.start().await, ContainerStatus::Running);

    let names = p.api.created_names();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], names[1]);
}

// ---------------------------------------------------------------------------
// stop()
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_poller() {
    let p = panel();
    p.controller.start().await;
    settle().await;

    assert_eq!(p.controller.stop().await, ContainerStatus::Stopped);
    let fetches = p.api.fetch_calls();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(p.api.fetch_calls(), fetches);

    let snapshot = p.controller.snapshot().await;
    assert!(!snapshot.polling);
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));

    let view = p.presenter.last_render().unwrap();
    assert_eq!(
        view.buttons,
        ButtonGates {
            start: true,
            stop: false,
            logs: false,
            delete: true
        }
    );
    assert!(
        p.presenter
            .appended_lines()
            .contains(&"Container stopped successfully".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn failed_stop_keeps_running_and_polling() {
    let p = panel();
    p.controller.start().await;
    settle().await;
    p.api.set_stop_result(ResultEnvelope::failure("container busy"));

    assert_eq!(p.controller.stop().await, ContainerStatus::Running);
    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));
    assert!(snapshot.polling);
    assert_eq!(
        p.presenter.appended_lines().last().map(String::as_str),
        Some("Error: container busy")
    );

    // The restarted poller waits one interval before its first fetch.
    let fetches = p.api.fetch_calls();
    settle().await;
    assert_eq!(p.api.fetch_calls(), fetches);
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(p.api.fetch_calls(), fetches + 1);
}

// ---------------------------------------------------------------------------
// delete()
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn delete_resets_session_and_fires_reset_once() {
    let p = panel();
    p.controller.start().await;
    settle().await;

    assert_eq!(p.controller.delete().await, ContainerStatus::Stopped);
    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id, None);
    assert_eq!(snapshot.session_token, None);
    assert!(!snapshot.polling);
    assert!(snapshot.reset_pending);

    let view = p.presenter.last_render().unwrap();
    assert_eq!(view.container_id_prefix, None);
    assert_eq!(
        view.buttons,
        ButtonGates {
            start: true,
            stop: false,
            logs: false,
            delete: false
        }
    );

    let fetches = p.api.fetch_calls();
    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert_eq!(p.presenter.reset_count(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(p.presenter.reset_count(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(p.presenter.reset_count(), 1);
    assert_eq!(p.api.fetch_calls(), fetches);
}

#[tokio::test(start_paused = true)]
async fn delete_of_stopped_container_uses_force() {
    let p = panel();
    p.controller.start().await;
    p.controller.stop().await;

    assert_eq!(p.controller.delete().await, ContainerStatus::Stopped);
    assert_eq!(p.api.remove_calls(), 1);
    assert_eq!(p.controller.snapshot().await.container_id, None);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_restores_previous_status() {
    let p = panel();
    p.controller.start().await;
    settle().await;
    p.api.set_remove_result(ResultEnvelope::failure("conflict"));

    assert_eq!(p.controller.delete().await, ContainerStatus::Running);
    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));
    assert!(snapshot.polling);
    assert!(!snapshot.reset_pending);

    p.controller.stop().await;
    assert_eq!(p.controller.delete().await, ContainerStatus::Stopped);
    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));
    assert!(!snapshot.polling);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(p.presenter.reset_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn start_after_delete_cancels_pending_reset_and_uses_new_name() {
    let p = panel();
    p.controller.start().await;
    p.controller.delete().await;

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(p.controller.start().await, ContainerStatus::Running);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(p.presenter.reset_count(), 0);

    let names = p.api.created_names();
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
}

// ---------------------------------------------------------------------------
// Log polling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn polled_tail_is_highlighted_snapshot() {
    let p = panel();
    p.api.set_logs("$ ls\nerror: nope\n");

    p.controller.start().await;
    settle().await;

    match p.presenter.terminal_updates().last() {
        Some(TerminalUpdate::Snapshot { raw, markup }) => {
            assert_eq!(raw, "$ ls\nerror: nope\n");
            assert_eq!(
                markup,
                "<span class=\"log-command\">$ ls</span>\n<span class=\"log-error\">error: nope</span>\n"
            );
        }
        other => panic!("expected a snapshot, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn log_fetch_failure_is_not_fatal() {
    let p = panel();
    p.api.set_logs_result(ResultEnvelope::failure("read timed out"));

    p.controller.start().await;
    tokio::time::sleep(Duration::from_millis(4010)).await;

    assert_eq!(p.controller.status().await, ContainerStatus::Running);
    assert_eq!(p.api.fetch_calls(), 3);
    assert!(
        !p.presenter
            .terminal_updates()
            .iter()
            .any(|u| matches!(u, TerminalUpdate::Snapshot { .. } | TerminalUpdate::Waiting { .. }))
    );
}

// ---------------------------------------------------------------------------
// Full-log view
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn full_logs_need_a_container() {
    let p = panel();
    assert_eq!(p.controller.view_full_logs().await, None);
    assert!(p.presenter.modals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn full_logs_fetch_two_hundred_lines_without_touching_poller() {
    let p = panel();
    p.controller.start().await;
    settle().await;
    p.api.set_logs("build success\n");

    let modal = p.controller.view_full_logs().await.unwrap();
    assert_eq!(
        modal,
        LogModal::Logs {
            raw: "build success\n".to_string(),
            markup: "<span class=\"log-success\">build success</span>\n".to_string(),
        }
    );
    assert_eq!(p.presenter.modals().first(), Some(&LogModal::Loading));
    assert_eq!(p.api.log_tails(), vec![20, 200]);
    assert!(p.controller.snapshot().await.polling);
}

#[tokio::test(start_paused = true)]
async fn full_logs_report_empty_and_failed_tails() {
    let p = panel();
    p.controller.start().await;
    settle().await;

    assert_eq!(
        p.controller.view_full_logs().await,
        Some(LogModal::Empty {
            message: NO_LOGS_AVAILABLE
        })
    );

    p.api.set_logs_result(ResultEnvelope::failure("Container c1 non trouvé"));
    assert_eq!(
        p.controller.view_full_logs().await,
        Some(LogModal::Failed {
            message: "Container c1 non trouvé".to_string()
        })
    );
    assert_eq!(p.controller.status().await, ContainerStatus::Running);
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_stops_polling() {
    let p = panel();
    p.controller.start().await;
    settle().await;
    let fetches = p.api.fetch_calls();

    drop(p.controller);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(p.api.fetch_calls(), fetches);
}

#[tokio::test(start_paused = true)]
async fn teardown_during_start_renders_nothing_more() {
    let p = panel();
    let gate = p.api.gate_create();

    let ctl = Arc::clone(&p.controller);
    let pending = tokio::spawn(async move { ctl.start().await });
    gate.wait_entered().await;

    p.controller.teardown().await;
    let events_before = p.presenter.events().len();

    gate.release();
    assert_eq!(pending.await.unwrap(), ContainerStatus::Running);

    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id.as_deref(), Some("c1"));
    assert!(!snapshot.polling);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(p.presenter.events().len(), events_before);
    assert_eq!(p.api.fetch_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn teardown_during_delete_schedules_no_reset() {
    let p = panel();
    p.controller.start().await;
    settle().await;
    let gate = p.api.gate_remove();

    let ctl = Arc::clone(&p.controller);
    let pending = tokio::spawn(async move { ctl.delete().await });
    gate.wait_entered().await;

    p.controller.teardown().await;
    let events_before = p.presenter.events().len();

    gate.release();
    assert_eq!(pending.await.unwrap(), ContainerStatus::Stopped);

    let snapshot = p.controller.snapshot().await;
    assert_eq!(snapshot.container_id, None);
    assert!(!snapshot.reset_pending);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(p.presenter.reset_count(), 0);
    assert_eq!(p.presenter.events().len(), events_before);
}
