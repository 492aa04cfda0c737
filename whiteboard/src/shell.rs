//! Editor shell: one editing session bound to a signed-in user and a profile store.
//!
//! DESIGN
//! ======
//! The shell is the only part of the editor that knows about the [`Session`].
//! It seeds the core from the stored composition on mount, feeds import
//! batches through the unordered decode stream, and runs the save round trip
//! (claim the save slot, write the profile, release the slot).
//!
//! ERROR HANDLING
//! ==============
//! Decode failures are logged at debug level and counted; they never reach the
//! user. A stored composition that fails to decode starts an empty canvas.
//! Save failures come back as `Err` and as an error notice, and leave the
//! editor state exactly as it was.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::engine::{Action, EditorCore};
use crate::import::{self, CandidateFile, DecodedImage, ImportError, ImportSource};
use crate::persist::{PersistError, ProfileStore, Session};
use crate::viewport::Size;

/// What the host should do after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Keep the editor open.
    Continue,
    /// Leave the editor.
    Exit,
}

/// Outcome counts for one import batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Layers appended.
    pub inserted: usize,
    /// Accepted files whose contents could not be decoded.
    pub failed: usize,
    /// Decodes that finished after teardown.
    pub discarded: usize,
}

/// An editor bound to a user session and a profile store.
pub struct EditorShell<S> {
    core: EditorCore,
    session: Session,
    store: S,
    notices: Vec<Action>,
}

impl<S: ProfileStore> EditorShell<S> {
    /// Open the editor for `session`, loading any stored composition.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the profile cannot be fetched.
    pub async fn mount(store: S, session: Session, container: Size) -> Result<Self, PersistError> {
        let profile = store.fetch_profile(&session).await?;
        let mut shell = Self { core: EditorCore::new(container), session, store, notices: Vec::new() };

        match profile.whiteboard.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(url) => match import::decode_data_url(url) {
                Ok(image) => {
                    shell.core.load_composition(image);
                }
                Err(e) => warn!(user_id = %shell.session.user_id, error = %e, "stored whiteboard unreadable; starting empty"),
            },
            None => debug!(user_id = %shell.session.user_id, "no stored whiteboard; starting empty"),
        }
        Ok(shell)
    }

    /// Open an empty editor without reading the profile.
    #[must_use]
    pub fn fresh(store: S, session: Session, container: Size) -> Self {
        Self { core: EditorCore::new(container), session, store, notices: Vec::new() }
    }

    /// Decode a batch and append one layer per successful decode, in completion order.
    pub async fn import_files(&mut self, files: Vec<CandidateFile>, source: ImportSource) -> ImportSummary {
        let decodes = import::decode_unordered(files, source);
        self.absorb(decodes, source).await
    }

    /// Like [`Self::import_files`], with each decode run by `run` (e.g. on a
    /// blocking pool).
    pub async fn import_files_with<R, Fut>(&mut self, files: Vec<CandidateFile>, source: ImportSource, run: R) -> ImportSummary
    where
        R: FnMut(CandidateFile, ImportSource) -> Fut,
        Fut: Future<Output = Result<DecodedImage, ImportError>>,
    {
        let decodes = import::decode_unordered_with(files, source, run);
        self.absorb(decodes, source).await
    }

    async fn absorb(
        &mut self,
        mut decodes: impl Stream<Item = Result<DecodedImage, ImportError>> + Unpin,
        source: ImportSource,
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();
        while let Some(result) = decodes.next().await {
            match result {
                Ok(decoded) => {
                    if self.core.insert_image(decoded.image).is_some() {
                        summary.inserted += 1;
                    } else {
                        summary.discarded += 1;
                    }
                }
                Err(e) => {
                    debug!(error = %e, ?source, "dropping undecodable import");
                    summary.failed += 1;
                }
            }
        }
        info!(inserted = summary.inserted, failed = summary.failed, ?source, "import batch finished");
        summary
    }

    /// Flatten for the confirmation preview. See [`EditorCore::request_finalize`].
    pub fn request_finalize(&mut self) -> Vec<Action> {
        self.core.request_finalize()
    }

    /// Write the composition to the profile.
    ///
    /// While a save is outstanding further calls fail with [`PersistError::Busy`].
    ///
    /// # Errors
    ///
    /// Returns the store's [`PersistError`]; layers, history, and the preview
    /// are left untouched so the save can be retried.
    pub async fn save(&mut self, mode: SaveMode) -> Result<SaveMode, PersistError> {
        let url = self.core.begin_persist()?;
        let result = self.store.update_whiteboard(&self.session, &url).await;
        let notice = self.core.finish_persist(&result);
        self.notices.push(notice);
        result?;
        if mode == SaveMode::Exit {
            self.core.teardown();
        }
        Ok(mode)
    }

    /// Notifications produced by saves since the last call.
    pub fn take_notices(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.notices)
    }

    /// Stop the editor. Imports still in flight are discarded on completion.
    pub fn teardown(&mut self) {
        self.core.teardown();
    }

    #[must_use]
    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
