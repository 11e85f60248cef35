//! End-to-end pipeline test: settings file in, published results and a
//! persisted history snapshot out, with a stub standing in for the
//! search executable.

#![cfg(unix)]

use fastfind::{
    DisplayItem, HistoryStore, ResultStore, SearchConfiguration, SearchHost, SearchQuery,
    SessionController, SessionState,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-rg");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[derive(Default)]
struct RecordingHost {
    published: Mutex<Option<(Vec<DisplayItem>, String)>>,
    errors: Mutex<Vec<String>>,
}

impl SearchHost for RecordingHost {
    fn progress(&self, _indicator: &str) {}

    fn publish(&self, items: Vec<DisplayItem>, summary: &str) {
        *self.published.lock().unwrap() = Some((items, summary.to_string()));
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn settings_to_published_results_and_persisted_history() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        concat!(
            r#"printf '%s\n' '{"type":"begin","data":{"path":{"text":"/repo/a.c"}}}'"#,
            "\n",
            r#"printf '%s\n' '{"type":"match","data":{"path":{"text":"/repo/a.c"},"line_number":3,"submatches":[{"start":0,"end":3}]}}'"#,
            "\n",
            r#"printf '%s\n' '{"type":"context","data":{"path":{"text":"/repo/a.c"},"line_number":4,"lines":{"text":"ctx"}}}'"#,
            "\n",
            r#"printf '%s\n' '{"type":"match","data":{"path":{"text":"/repo/b.c"},"line_number":9,"submatches":[{"start":2,"end":5}]}}'"#,
            "\n",
            r#"printf '%s\n' '{"type":"summary","data":{"stats":{"matched_lines":2}}}'"#,
        ),
    );

    let settings_path = dir.path().join("settings.json");
    std::fs::write(
        &settings_path,
        format!(
            r#"{{
                "executable": "{}",
                "case_sensitive": true,
                "before_context": 1,
                "after_context": 1,
                "history_file": "fastfind_history.json"
            }}"#,
            stub.display()
        ),
    )
    .unwrap();

    let config = SearchConfiguration::load(&settings_path).unwrap();
    let history_path =
        fastfind::resolve_history_path(Some(dir.path()), config.history_file.as_deref()).unwrap();
    let history = HistoryStore::load_or_default(Some(history_path.clone()));
    let controller = SessionController::new(config, ResultStore::new(history));

    let host = RecordingHost::default();
    let state = controller
        .run(SearchQuery::new("foo", "/repo"), &host)
        .await;
    assert_eq!(state, SessionState::Published);

    let published = host.published.lock().unwrap();
    let (items, summary) = published.as_ref().unwrap();
    assert_eq!(summary, "found 2 occurrences of 'foo'");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].target.filename, "/repo/a.c");
    assert_eq!(items[0].target.line_number, 3);
    assert_eq!(items[0].target.match_length, 3);
    assert_eq!(items[1].target.filename, "/repo/b.c");
    assert_eq!(items[1].target.line_number, 9);
    assert!(host.errors.lock().unwrap().is_empty());

    // The snapshot landed in the project directory and reloads into an
    // equal mapping.
    assert!(history_path.exists());
    let reloaded = HistoryStore::load(Some(history_path)).unwrap();
    let stored = reloaded.get("foo").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].column, 2);
}

#[tokio::test]
async fn failed_search_reports_once_and_leaves_no_history() {
    let dir = tempfile::tempdir().unwrap();
    let history_path = dir.path().join("history.json");

    let config = SearchConfiguration {
        executable: "fastfind-no-such-binary".to_string(),
        ..Default::default()
    };
    let history = HistoryStore::load_or_default(Some(history_path.clone()));
    let controller = SessionController::new(config, ResultStore::new(history));

    let host = RecordingHost::default();
    let state = controller
        .run(SearchQuery::new("foo", "/repo"), &host)
        .await;

    assert_eq!(state, SessionState::Failed);
    assert_eq!(host.errors.lock().unwrap().len(), 1);
    assert!(host.published.lock().unwrap().is_none());
    assert!(!history_path.exists());
}
