#![allow(clippy::float_cmp)]

use std::io::Cursor;
use std::sync::Mutex;

use image::{ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::engine::NotifyLevel;
use crate::export;
use crate::layers::LayerStack;
use crate::persist::ProfileRecord;

// =========================================================================
// MockStore
// =========================================================================

#[derive(Default)]
struct MockStore {
    profile: Mutex<ProfileRecord>,
    fail_updates: Mutex<bool>,
    fail_fetch: bool,
    updates: Mutex<Vec<String>>,
}

impl MockStore {
    fn with_whiteboard(url: Option<String>) -> Self {
        Self { profile: Mutex::new(ProfileRecord { id: "u1".into(), whiteboard: url }), ..Self::default() }
    }

    fn set_failing(&self, fail: bool) {
        *self.fail_updates.lock().unwrap() = fail;
    }

    fn updates(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MockStore {
    async fn fetch_profile(&self, session: &Session) -> Result<ProfileRecord, PersistError> {
        if self.fail_fetch {
            return Err(PersistError::NotFound { user_id: session.user_id.clone() });
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_whiteboard(&self, _session: &Session, data_url: &str) -> Result<(), PersistError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(PersistError::Transport("connection reset".into()));
        }
        self.updates.lock().unwrap().push(data_url.to_owned());
        self.profile.lock().unwrap().whiteboard = Some(data_url.to_owned());
        Ok(())
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn session() -> Session {
    Session::new("u1", "token")
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbaImage::from_pixel(w, h, Rgba([0, 128, 255, 255]))
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn saved_composition() -> String {
    let mut layers = LayerStack::new();
    layers.insert(std::sync::Arc::new(RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255]))));
    export::flatten_to_data_url(layers.as_slice()).unwrap()
}

// =========================================================================
// mount
// =========================================================================

#[tokio::test]
async fn mount_without_saved_composition_starts_empty() {
    let shell = EditorShell::mount(MockStore::with_whiteboard(None), session(), Size::canvas()).await.unwrap();
    assert!(shell.core().layers().is_empty());
    assert_eq!(shell.core().history().len(), 1);
}

#[tokio::test]
async fn mount_loads_saved_composition_as_full_canvas_layer() {
    let store = MockStore::with_whiteboard(Some(saved_composition()));
    let shell = EditorShell::mount(store, session(), Size::canvas()).await.unwrap();

    let core = shell.core();
    assert_eq!(core.layers().len(), 1);
    let layer = core.layers().get(0).unwrap();
    assert_eq!((layer.x, layer.y), (0.0, 0.0));
    assert_eq!((layer.width, layer.height), (CANVAS_WIDTH, CANVAS_HEIGHT));
    assert_eq!(core.history().len(), 1);
    assert_eq!(core.history().step(), 0);
}

#[tokio::test]
async fn mount_with_unreadable_composition_starts_empty() {
    let store = MockStore::with_whiteboard(Some("data:image/png;base64,AAAA".into()));
    let shell = EditorShell::mount(store, session(), Size::canvas()).await.unwrap();
    assert!(shell.core().layers().is_empty());
}

#[tokio::test]
async fn mount_with_blank_whiteboard_field_starts_empty() {
    let store = MockStore::with_whiteboard(Some("   ".into()));
    let shell = EditorShell::mount(store, session(), Size::canvas()).await.unwrap();
    assert!(shell.core().layers().is_empty());
}

#[tokio::test]
async fn mount_propagates_fetch_failure() {
    let store = MockStore { fail_fetch: true, ..MockStore::default() };
    let result = EditorShell::mount(store, session(), Size::canvas()).await;
    assert!(matches!(result, Err(PersistError::NotFound { .. })));
}

// =========================================================================
// import
// =========================================================================

#[tokio::test]
async fn import_inserts_one_layer_per_decoded_file() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    let files = vec![
        CandidateFile::new("a.png", "image/png", png(10, 10)),
        CandidateFile::new("b.png", "image/png", png(20, 30)),
        CandidateFile::new("c.png", "image/png", vec![0, 1, 2]),
        CandidateFile::new("notes.txt", "text/plain", b"x".to_vec()),
    ];

    let summary = shell.import_files(files, ImportSource::Drop).await;

    assert_eq!(summary, ImportSummary { inserted: 2, failed: 1, discarded: 0 });
    let core = shell.core();
    assert_eq!(core.layers().len(), 2);
    assert_eq!(core.history().len(), 3);
    let mut sizes: Vec<_> = core.layers().iter().map(|l| (l.width, l.height)).collect();
    sizes.sort_by(|a, b| a.0.total_cmp(&b.0));
    assert_eq!(sizes, [(10.0, 10.0), (20.0, 30.0)]);
    assert!(core.layers().iter().all(|l| (l.x, l.y) == (100.0, 100.0)));
}

#[tokio::test]
async fn import_after_teardown_is_discarded() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    shell.teardown();
    let summary = shell
        .import_files(vec![CandidateFile::new("a.png", "image/png", png(4, 4))], ImportSource::Paste)
        .await;
    assert_eq!(summary.discarded, 1);
    assert!(shell.core().layers().is_empty());
}

// =========================================================================
// save
// =========================================================================

#[tokio::test]
async fn save_and_continue_writes_profile_and_keeps_editing() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    shell.import_files(vec![CandidateFile::new("a.png", "image/png", png(8, 8))], ImportSource::Picker).await;
    shell.request_finalize();

    let mode = shell.save(SaveMode::Continue).await.unwrap();

    assert_eq!(mode, SaveMode::Continue);
    let updates = shell.store().updates();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].starts_with("data:image/jpeg;base64,"));
    assert!(!shell.core().is_torn_down());
    assert!(shell.core_mut().insert_image(std::sync::Arc::new(RgbaImage::new(2, 2))).is_some());
    let notices = shell.take_notices();
    assert!(matches!(notices.as_slice(), [Action::Notify { level: NotifyLevel::Info, .. }]));
}

#[tokio::test]
async fn save_and_exit_tears_down() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    shell.save(SaveMode::Exit).await.unwrap();
    assert!(shell.core().is_torn_down());
}

#[tokio::test]
async fn failed_save_preserves_state_and_allows_retry() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    let files = (0..3).map(|i| CandidateFile::new(format!("{i}.png"), "image/png", png(5 + i, 5))).collect();
    shell.import_files(files, ImportSource::Drop).await;
    shell.request_finalize();
    let layers = shell.core().layers().snapshot();
    let (len, step) = (shell.core().history().len(), shell.core().history().step());

    shell.store().set_failing(true);
    let err = shell.save(SaveMode::Exit).await.unwrap_err();

    assert!(matches!(err, PersistError::Transport(_)));
    assert_eq!(shell.core().layers().as_slice(), layers.as_slice());
    assert_eq!((shell.core().history().len(), shell.core().history().step()), (len, step));
    assert!(shell.core().preview().is_some());
    assert!(!shell.core().is_torn_down());
    assert!(matches!(shell.take_notices().as_slice(), [Action::Notify { level: NotifyLevel::Error, .. }]));

    shell.store().set_failing(false);
    shell.save(SaveMode::Exit).await.unwrap();
    assert_eq!(shell.store().updates().len(), 1);
}

#[tokio::test]
async fn saved_composition_round_trips_through_mount() {
    let mut shell = EditorShell::fresh(MockStore::with_whiteboard(None), session(), Size::canvas());
    shell.import_files(vec![CandidateFile::new("a.png", "image/png", png(50, 50))], ImportSource::Drop).await;
    shell.save(SaveMode::Exit).await.unwrap();

    let store = MockStore::with_whiteboard(shell.store().updates().pop());
    let reopened = EditorShell::mount(store, session(), Size::canvas()).await.unwrap();
    assert_eq!(reopened.core().layers().len(), 1);
    assert_eq!(reopened.core().layers().get(0).unwrap().image.dimensions(), (1500, 800));
}

#[tokio::test]
async fn import_files_with_uses_the_given_runner() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    let files = vec![
        CandidateFile::new("a.png", "image/png", png(6, 6)),
        CandidateFile::new("b.png", "image/png", png(7, 3)),
        CandidateFile::new("c.txt", "text/plain", b"skip".to_vec()),
    ];
    let summary = shell
        .import_files_with(files, ImportSource::Drop, |file, source| async move {
            let name = file.name.clone();
            tokio::task::spawn_blocking(move || import::decode(&file, source))
                .await
                .map_err(|e| ImportError::Task { name, reason: e.to_string() })?
        })
        .await;
    assert_eq!(summary, ImportSummary { inserted: 2, failed: 0, discarded: 0 });
    assert_eq!(shell.core().layers().len(), 2);
}

#[tokio::test]
async fn runner_failures_count_as_failed() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    let files = vec![CandidateFile::new("a.png", "image/png", png(6, 6))];
    let summary = shell
        .import_files_with(files, ImportSource::Paste, |file, _| async move {
            Err(ImportError::Task { name: file.name, reason: "cancelled".into() })
        })
        .await;
    assert_eq!(summary.failed, 1);
    assert!(shell.core().layers().is_empty());
}

#[tokio::test]
async fn save_after_editing_an_open_preview_stores_the_live_canvas() {
    let mut shell = EditorShell::fresh(MockStore::default(), session(), Size::canvas());
    shell.import_files(vec![CandidateFile::new("a.png", "image/png", png(20, 20))], ImportSource::Drop).await;
    let stale = shell
        .request_finalize()
        .into_iter()
        .find_map(|a| if let Action::PreviewReady(url) = a { Some(url) } else { None })
        .unwrap();

    shell.import_files(vec![CandidateFile::new("b.png", "image/png", png(300, 300))], ImportSource::Drop).await;
    shell.save(SaveMode::Continue).await.unwrap();

    let saved = shell.store().updates().pop().unwrap();
    assert_ne!(saved, stale);
    assert_eq!(saved, export::flatten_to_data_url(shell.core().layers().as_slice()).unwrap());
}
