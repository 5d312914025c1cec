use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, OnceLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use meson_core::diagnostic::Diagnostic;

use super::*;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.events.lock().unwrap().clone()
    }

    fn last_for(&self, file: &Path) -> Option<Vec<String>> {
        self.events()
            .into_iter()
            .rev()
            .find(|(f, _)| f == file)
            .map(|(_, messages)| messages)
    }
}

#[tower_lsp::async_trait]
impl DiagnosticsSink for RecordingSink {
    async fn publish(&self, file: &Path, diagnostics: &[Diagnostic]) {
        let messages = diagnostics.iter().map(|d| d.message.clone()).collect();
        self.events.lock().unwrap().push((file.to_path_buf(), messages));
    }
}

/// Applies one extra signal the first time a rebuild finishes `phase`.
struct InterruptingSink {
    recording: RecordingSink,
    phase: RebuildPhase,
    fired: AtomicBool,
    workspace: OnceLock<Weak<Workspace>>,
}

#[tower_lsp::async_trait]
impl DiagnosticsSink for InterruptingSink {
    async fn publish(&self, file: &Path, diagnostics: &[Diagnostic]) {
        self.recording.publish(file, diagnostics).await;
    }

    async fn phase_finished(&self, _generation: u64, phase: RebuildPhase) {
        if phase != self.phase || self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(ws) = self.workspace.get().and_then(Weak::upgrade) {
            ws.apply(Signal::Reload);
        }
    }
}

fn workspace(debounce_ms: u64) -> (Arc<Workspace>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let ws = Workspace::new(
        PathBuf::from("/project"),
        meson_stdlib::namespace().unwrap(),
        sink.clone(),
        WorkspaceOptions {
            debounce: Duration::from_millis(debounce_ms),
            max_concurrent: 2,
        },
    );
    (ws, sink)
}

fn root_file() -> PathBuf {
    PathBuf::from("/project/meson.build")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_only_the_last_signal_publishes() {
    let (ws, sink) = workspace(50);
    let handle = WorkspaceHandle::spawn(ws.clone());
    let mut commits = ws.subscribe();

    handle.send(Signal::Open {
        path: root_file(),
        text: "x = unknown0\n".to_string(),
    });
    for i in 1..5 {
        handle.send(Signal::Change {
            path: root_file(),
            text: format!("x = unknown{}\n", i),
        });
    }

    tokio::time::timeout(Duration::from_secs(10), commits.wait_for(|g| *g >= 5))
        .await
        .expect("no commit")
        .unwrap();

    assert_eq!(ws.generation(), 5);
    let events = sink.events();
    assert_eq!(events, vec![(root_file(), vec!["Unknown identifier 'unknown4'".to_string()])]);
    let tree = ws.snapshot().await.unwrap();
    assert_eq!(tree.root().ast.as_ref().unwrap().source(), "x = unknown4\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_rebuild_has_no_effect() {
    let (ws, sink) = workspace(0);
    let first = ws.apply(Signal::Open {
        path: root_file(),
        text: "a = 1\n".to_string(),
    });
    let second = ws.apply(Signal::Change {
        path: root_file(),
        text: "b = nope\n".to_string(),
    });

    assert_eq!(ws.clone().rebuild(first).await, RebuildOutcome::Superseded);
    assert!(sink.events().is_empty());
    assert!(ws.snapshot().await.is_none());

    assert_eq!(ws.clone().rebuild(second).await, RebuildOutcome::Committed(second));
    assert_eq!(sink.last_for(&root_file()), Some(vec!["Unknown identifier 'nope'".to_string()]));
    assert_eq!(*ws.subscribe().borrow(), second);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_files_leaving_the_tree_are_cleared() {
    let (ws, sink) = workspace(0);
    let child = PathBuf::from("/project/a/meson.build");
    ws.source().set_override(child.clone(), "y = nope\n".to_string());
    let generation = ws.apply(Signal::Open {
        path: root_file(),
        text: "subdir('a')\n".to_string(),
    });
    ws.clone().rebuild(generation).await;
    assert_eq!(sink.last_for(&child), Some(vec!["Unknown identifier 'nope'".to_string()]));

    let generation = ws.apply(Signal::Change {
        path: root_file(),
        text: "x = 1\n".to_string(),
    });
    ws.clone().rebuild(generation).await;
    assert_eq!(sink.last_for(&child), Some(Vec::new()));
    assert_eq!(sink.last_for(&root_file()), Some(Vec::new()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_evicts_file_state() {
    let (ws, sink) = workspace(0);
    let child = PathBuf::from("/project/a/meson.build");
    ws.source().set_override(child.clone(), "y = 1\n".to_string());
    let generation = ws.apply(Signal::Open {
        path: root_file(),
        text: "subdir('a')\n".to_string(),
    });
    ws.clone().rebuild(generation).await;
    assert!(ws.cache().contains(&child));
    // open files never enter the cache
    assert!(!ws.cache().contains(&root_file()));

    let generation = ws.apply(Signal::DeleteFiles(vec![child.clone()]));
    assert!(!ws.cache().contains(&child));
    assert!(!ws.source().has_override(&child));
    ws.clone().rebuild(generation).await;
    assert_eq!(
        sink.last_for(&root_file()),
        Some(vec!["Directory 'a' does not contain a meson.build".to_string()])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_falls_back_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("meson.build");
    std::fs::write(&root, "x = 1\n").unwrap();

    let sink = Arc::new(RecordingSink::default());
    let ws = Workspace::new(
        dir.path().to_path_buf(),
        meson_stdlib::namespace().unwrap(),
        sink.clone(),
        WorkspaceOptions {
            debounce: Duration::ZERO,
            max_concurrent: 1,
        },
    );
    let root = ws.root_dir().join("meson.build");
    let generation = ws.apply(Signal::Open {
        path: root.clone(),
        text: "x = broken\n".to_string(),
    });
    ws.clone().rebuild(generation).await;
    assert_eq!(sink.last_for(&root), Some(vec!["Unknown identifier 'broken'".to_string()]));

    let generation = ws.apply(Signal::Close { path: root.clone() });
    ws.clone().rebuild(generation).await;
    assert_eq!(sink.last_for(&root), Some(Vec::new()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_root_fails_and_clears() {
    let (ws, sink) = workspace(0);
    let generation = ws.apply(Signal::Open {
        path: root_file(),
        text: "x = nope\n".to_string(),
    });
    ws.clone().rebuild(generation).await;
    assert!(ws.snapshot().await.is_some());

    let generation = ws.apply(Signal::DeleteFiles(vec![root_file()]));
    assert_eq!(ws.clone().rebuild(generation).await, RebuildOutcome::Failed);
    assert!(ws.snapshot().await.is_none());
    assert_eq!(sink.last_for(&root_file()), Some(Vec::new()));
}

#[test]
fn test_generation_increments_per_signal() {
    let (ws, _) = workspace(0);
    assert_eq!(ws.apply(Signal::Reload), 1);
    assert_eq!(ws.apply(Signal::CreateFiles(vec![root_file()])), 2);
    assert_eq!(ws.apply(Signal::Save { path: root_file() }), 3);
    assert_eq!(ws.generation(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signal_during_a_phase_supersedes() {
    for phase in [RebuildPhase::Parse, RebuildPhase::Analysis] {
        let sink = Arc::new(InterruptingSink {
            recording: RecordingSink::default(),
            phase,
            fired: AtomicBool::new(false),
            workspace: OnceLock::new(),
        });
        let ws = Workspace::new(
            PathBuf::from("/project"),
            meson_stdlib::namespace().unwrap(),
            sink.clone(),
            WorkspaceOptions {
                debounce: Duration::ZERO,
                max_concurrent: 1,
            },
        );
        sink.workspace.set(Arc::downgrade(&ws)).unwrap();

        let generation = ws.apply(Signal::Open {
            path: root_file(),
            text: "x = nope\n".to_string(),
        });
        assert_eq!(ws.clone().rebuild(generation).await, RebuildOutcome::Superseded, "{:?}", phase);
        assert_eq!(ws.generation(), generation + 1);
        assert!(sink.recording.events().is_empty(), "{:?}", phase);
        assert!(ws.snapshot().await.is_none());
        assert_eq!(*ws.subscribe().borrow(), 0);

        let newer = ws.generation();
        assert_eq!(ws.clone().rebuild(newer).await, RebuildOutcome::Committed(newer));
        assert_eq!(
            sink.recording.last_for(&root_file()),
            Some(vec!["Unknown identifier 'nope'".to_string()])
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_failed_rebuild_keeps_the_newer_state() {
    let (ws, sink) = workspace(0);
    let generation = ws.apply(Signal::Open {
        path: root_file(),
        text: "x = nope\n".to_string(),
    });
    assert_eq!(ws.clone().rebuild(generation).await, RebuildOutcome::Committed(generation));

    // the root disappears; the rebuild fails and waits for the publish lock
    let failing = ws.apply(Signal::DeleteFiles(vec![root_file()]));
    let guard = ws.published.lock().await;
    let task = tokio::spawn(ws.clone().rebuild(failing));
    tokio::time::sleep(Duration::from_millis(100)).await;
    let newer = ws.apply(Signal::Open {
        path: root_file(),
        text: "y = 1\n".to_string(),
    });
    drop(guard);

    assert_eq!(task.await.unwrap(), RebuildOutcome::Superseded);
    assert!(ws.snapshot().await.is_some());
    assert_eq!(sink.last_for(&root_file()), Some(vec!["Unknown identifier 'nope'".to_string()]));

    assert_eq!(ws.clone().rebuild(newer).await, RebuildOutcome::Committed(newer));
    assert_eq!(sink.last_for(&root_file()), Some(Vec::new()));
}
