//! Integration tests for the build orchestrator.
//!
//! External stage commands are replaced with small `sh` scripts so the
//! full pipeline (workspace lifecycle, stage sequencing, failure and
//! cancellation paths, terminal-event invariants) runs without the real
//! packaging toolchain.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sitewrap_core::{
    BuildConfig, BuildEvent, CancelledPicker, CommandSpec, DestinationPicker, FixedDestination,
    FrameMode, IconPayload, IconResolver, Orchestrator, Stage, TerminalResult, ToolCommands,
    WindowOptions,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An icon resolver whose favicon proxy points at a closed local port,
/// so no test ever touches the network.
fn offline_icons() -> IconResolver {
    IconResolver::with_favicon_proxy_base("http://127.0.0.1:1/favicons")
}

/// Config with a custom icon so resolution returns without any fetch.
fn demo_config() -> BuildConfig {
    BuildConfig {
        url: "http://127.0.0.1:1".into(),
        name: "Demo".into(),
        window: WindowOptions::default(),
        frame: FrameMode::System,
        icon: IconPayload::from_bytes(vec![0u8; 16]),
    }
}

fn sh(script: impl Into<String>, label: &str) -> CommandSpec {
    CommandSpec::new("sh", ["-c".to_string(), script.into()], label)
}

/// Tools whose install stage records its working directory (the
/// workspace) into `marker` before running `install_script`.
fn tools(marker: &Path, install_script: &str, package_script: &str) -> ToolCommands {
    ToolCommands {
        install: sh(
            format!("pwd > {} && {install_script}", marker.display()),
            "npm install",
        ),
        package: sh(package_script.to_string(), "electron-builder"),
    }
}

async fn collect(mut rx: UnboundedReceiver<BuildEvent>) -> Vec<BuildEvent> {
    let mut events = Vec::new();
    let deadline = Duration::from_secs(60);
    while let Ok(Some(event)) = tokio::time::timeout(deadline, rx.recv()).await {
        events.push(event);
    }
    events
}

fn terminal_of(events: &[BuildEvent]) -> &TerminalResult {
    match events.last() {
        Some(BuildEvent::Done(result)) => result,
        other => panic!("expected terminal event last, got {other:?}"),
    }
}

fn assert_single_terminal_last(events: &[BuildEvent]) {
    let done_count = events
        .iter()
        .filter(|e| matches!(e, BuildEvent::Done(_)))
        .count();
    assert_eq!(done_count, 1, "exactly one terminal event per session");
    assert!(
        matches!(events.last(), Some(BuildEvent::Done(_))),
        "terminal event must be the last event"
    );
}

fn recorded_workspace(marker: &Path) -> PathBuf {
    let raw = std::fs::read_to_string(marker).expect("install stage should have run");
    PathBuf::from(raw.trim())
}

#[tokio::test]
async fn successful_build_extracts_artifact_and_removes_workspace() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let ext = sitewrap_core::workspace::artifact_extension();
    let orchestrator = Orchestrator::with_components(
        tools(
            &marker,
            "exit 0",
            &format!("mkdir -p dist && echo binary > 'dist/Demo.{ext}'"),
        ),
        offline_icons(),
    );

    std::fs::create_dir_all(dest.path().join("out")).unwrap();
    let rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().join("out"))),
        )
        .unwrap();
    let events = collect(rx).await;

    assert_single_terminal_last(&events);
    let TerminalResult::Success {
        artifact_path,
        containing_dir,
    } = terminal_of(&events)
    else {
        panic!("expected success, got {:?}", terminal_of(&events));
    };
    let artifact = artifact_path.as_ref().expect("artifact should be found");
    assert_eq!(
        artifact.file_name().unwrap().to_string_lossy(),
        format!("Demo.{ext}")
    );
    assert!(artifact.is_file());
    assert_eq!(containing_dir, &dest.path().join("out"));

    let workspace = recorded_workspace(&marker);
    assert!(!workspace.exists(), "workspace must be gone after terminal");
    assert!(!orchestrator.is_building());
}

#[tokio::test]
async fn progress_events_follow_strict_stage_order() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "exit 0", "exit 0"),
        offline_icons(),
    );

    let rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();
    let events = collect(rx).await;

    let stages: Vec<Stage> = events
        .iter()
        .filter_map(|e| match e {
            BuildEvent::Progress(p) => Some(p.stage),
            BuildEvent::Done(_) => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            Stage::Workspace,
            Stage::Icon,
            Stage::Scaffold,
            Stage::Install,
            Stage::Package,
            Stage::Extract,
            Stage::Extract,
        ]
    );
    // Clean package exit without an artifact is still a success.
    assert!(matches!(
        terminal_of(&events),
        TerminalResult::Success {
            artifact_path: None,
            ..
        }
    ));
}

#[tokio::test]
async fn install_failure_reports_tool_exit_code_and_stderr_tail() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(
            &marker,
            "echo 'network unreachable' >&2; exit 1",
            "echo should-not-run",
        ),
        offline_icons(),
    );

    let rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();
    let events = collect(rx).await;

    assert_single_terminal_last(&events);
    let TerminalResult::Aborted {
        user_initiated,
        error_detail,
    } = terminal_of(&events)
    else {
        panic!("expected abort");
    };
    assert!(!user_initiated);
    let detail = error_detail.as_ref().unwrap();
    assert!(detail.contains("npm install exit code 1"), "got: {detail}");
    assert!(detail.contains("network unreachable"), "got: {detail}");

    // Package stage never ran.
    assert!(
        !events.iter().any(|e| matches!(
            e,
            BuildEvent::Progress(p) if p.stage == Stage::Package
        )),
        "package stage must not start after install failure"
    );
    assert!(!recorded_workspace(&marker).exists());
}

#[tokio::test]
async fn package_failure_reports_its_own_tool_name() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "exit 0", "echo 'out of disk' >&2; exit 7"),
        offline_icons(),
    );

    let rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();
    let events = collect(rx).await;

    let TerminalResult::Aborted {
        user_initiated,
        error_detail,
    } = terminal_of(&events)
    else {
        panic!("expected abort");
    };
    assert!(!user_initiated);
    let detail = error_detail.as_ref().unwrap();
    assert!(detail.contains("electron-builder exit code 7"), "got: {detail}");
    assert!(detail.contains("out of disk"), "got: {detail}");
    assert!(!recorded_workspace(&marker).exists());
}

#[tokio::test]
async fn start_while_active_is_a_rejected_no_op() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "sleep 15", "exit 0"),
        offline_icons(),
    );

    let rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();

    // Wait until the first session is visibly active, then try a second.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(orchestrator.is_building());
    let second = orchestrator.start_build(
        demo_config(),
        Arc::new(FixedDestination::new(dest.path().to_path_buf())),
    );
    assert!(second.is_err(), "second start must be dropped");

    orchestrator.cancel().await;
    let events = collect(rx).await;
    assert_single_terminal_last(&events);
    assert_eq!(terminal_of(&events), &TerminalResult::user_cancelled());
}

#[tokio::test]
async fn cancel_during_package_kills_process_and_aborts_quickly() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "exit 0", "sleep 15"),
        offline_icons(),
    );

    let mut rx = orchestrator
        .start_build(
            demo_config(),
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();

    let mut events = Vec::new();
    // Drain until the package stage has been announced.
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("events should keep flowing")
            .expect("stream should stay open before terminal");
        let reached_package = matches!(
            &event,
            BuildEvent::Progress(p) if p.stage == Stage::Package
        );
        events.push(event);
        if reached_package {
            break;
        }
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = Instant::now();
    assert!(orchestrator.cancel().await.is_none());

    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await {
        events.push(event);
    }
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "cancellation must not wait for the tool to finish"
    );
    assert_single_terminal_last(&events);
    assert_eq!(terminal_of(&events), &TerminalResult::user_cancelled());
    assert!(!recorded_workspace(&marker).exists());
}

#[tokio::test]
async fn cancelled_destination_picker_aborts_before_any_stage() {
    let orchestrator =
        Orchestrator::with_components(tools(Path::new("/dev/null"), "exit 0", "exit 0"), offline_icons());

    let rx = orchestrator
        .start_build(demo_config(), Arc::new(CancelledPicker))
        .unwrap();
    let events = collect(rx).await;

    assert_eq!(events.len(), 1, "no progress events before picker abort");
    assert_eq!(terminal_of(&events), &TerminalResult::user_cancelled());
}

/// Picker whose selection panics, standing in for any collaborator
/// failing inside the pipeline task.
struct ExplodingPicker;

#[async_trait]
impl DestinationPicker for ExplodingPicker {
    async fn pick_destination(&self) -> Option<PathBuf> {
        panic!("picker blew up");
    }
}

#[tokio::test]
async fn panic_in_pipeline_yields_single_internal_fault_terminal() {
    let orchestrator = Orchestrator::with_components(
        tools(Path::new("/dev/null"), "exit 0", "exit 0"),
        offline_icons(),
    );

    let rx = orchestrator
        .start_build(demo_config(), Arc::new(ExplodingPicker))
        .unwrap();
    let events = collect(rx).await;

    assert_single_terminal_last(&events);
    let TerminalResult::Aborted {
        user_initiated,
        error_detail,
    } = terminal_of(&events)
    else {
        panic!("expected abort, got {:?}", terminal_of(&events));
    };
    assert!(!user_initiated);
    let detail = error_detail.as_ref().unwrap();
    assert!(detail.contains("internal fault"), "got: {detail}");
    assert!(!orchestrator.is_building(), "slot must be free after fault");
}

/// PNG header bytes; the delayed favicon response keeps icon resolution
/// in flight long enough for a cancel to land during it.
fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&width.to_be_bytes());
    png.extend_from_slice(&height.to_be_bytes());
    png.extend_from_slice(&[8, 6, 0, 0, 0]);
    png
}

#[tokio::test]
async fn cancel_during_icon_resolution_aborts_before_install() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_bytes(png_header(64, 64)),
        )
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "exit 0", "exit 0"),
        IconResolver::with_favicon_proxy_base(format!("{}/favicons", server.uri())),
    );
    let mut config = demo_config();
    config.icon = None;
    config.url = server.uri();

    let mut rx = orchestrator
        .start_build(
            config,
            Arc::new(FixedDestination::new(dest.path().to_path_buf())),
        )
        .unwrap();

    // The workspace announcement means icon resolution is next; the
    // delayed favicon response holds it open while the cancel lands.
    let first = tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("first event should arrive")
        .expect("stream should be open");
    assert!(matches!(
        &first,
        BuildEvent::Progress(p) if p.stage == Stage::Workspace
    ));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(orchestrator.cancel().await.is_none());

    let mut events = vec![first];
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await {
        events.push(event);
    }

    assert_single_terminal_last(&events);
    assert_eq!(terminal_of(&events), &TerminalResult::user_cancelled());
    assert!(
        !events.iter().any(|e| matches!(
            e,
            BuildEvent::Progress(p) if p.stage == Stage::Install
        )),
        "install stage must not start after a cancel during icon resolution"
    );
    assert!(!marker.exists(), "install command must never have run");
    assert!(!orchestrator.is_building());
}

#[tokio::test]
async fn session_slot_is_free_for_a_new_build_after_terminal() {
    let dest = TempDir::new().unwrap();
    let marker = dest.path().join("workspace.txt");
    let orchestrator = Orchestrator::with_components(
        tools(&marker, "exit 0", "exit 0"),
        offline_icons(),
    );
    let picker = Arc::new(FixedDestination::new(dest.path().to_path_buf()));

    let events = collect(orchestrator.start_build(demo_config(), picker.clone()).unwrap()).await;
    assert_single_terminal_last(&events);

    // The slot must be clear by the time the terminal event is observed.
    let second = orchestrator.start_build(demo_config(), picker);
    assert!(second.is_ok(), "new session must be accepted after terminal");
    let events = collect(second.unwrap()).await;
    assert_single_terminal_last(&events);
}
