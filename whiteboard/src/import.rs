//! Image import pipeline: candidate files from the picker, drag-and-drop, or
//! clipboard paste, filtered to `image/*` and decoded to RGBA layers.
//!
//! DESIGN
//! ======
//! Every accepted file decodes independently. [`decode_unordered`] yields
//! results as they complete, with no ordering guarantee relative to the input
//! list, and the editor appends one layer per successful decode. A failed
//! decode only loses that one file.
//!
//! Where each decode runs is up to the host: [`decode_unordered_with`] takes a
//! runner that turns one file into a future, so a native host can hand the
//! work to a blocking pool. The default runner yields to the executor before
//! decoding so a batch never monopolises a single poll.
//!
//! ERROR HANDLING
//! ==============
//! Non-image entries are skipped without an error. Decode failures are returned
//! to the caller, which logs and drops them; nothing is surfaced to the user.

#[cfg(test)]
#[path = "import_test.rs"]
mod import_test;

use std::sync::Arc;
use std::task::Poll;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::Stream;
use futures::stream::FuturesUnordered;
use tracing::debug;

use crate::layers::LayerImage;

/// Where a batch of candidate files came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    /// The file-picker dialog.
    Picker,
    /// Files dropped onto the editor.
    Drop,
    /// Clipboard paste while the editor has focus.
    Paste,
}

/// One user-supplied file, already read into memory by the host.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// File name as reported by the browser (may be empty for pasted data).
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), media_type: media_type.into(), bytes }
    }

    /// Whether the declared media type is `image/*`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }
}

/// A successfully decoded import, ready to become a layer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub name: String,
    pub source: ImportSource,
    pub image: LayerImage,
}

/// Errors produced while decoding imported or saved images.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The bytes are not a supported or intact image.
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// The string does not start with `data:` or has no payload separator.
    #[error("malformed data URL")]
    MalformedDataUrl,

    /// The data URL payload is not base64 encoded.
    #[error("data URL payload is not base64")]
    NotBase64,

    /// The data URL declares a non-image media type.
    #[error("data URL is not an image: {0}")]
    NotImage(String),

    /// The base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The task running a decode was cancelled or panicked.
    #[error("decode task for {name} did not finish: {reason}")]
    Task { name: String, reason: String },
}

fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Keep only `image/*` entries. Everything else is dropped silently.
#[must_use]
pub fn accept_images(files: Vec<CandidateFile>, source: ImportSource) -> Vec<CandidateFile> {
    files
        .into_iter()
        .filter(|file| {
            let keep = file.is_image();
            if !keep {
                debug!(name = %file.name, media_type = %file.media_type, ?source, "skipping non-image import");
            }
            keep
        })
        .collect()
}

/// Decode raw bytes into shared RGBA pixels.
///
/// # Errors
///
/// Returns [`ImportError::Decode`] if the bytes are not a decodable image.
pub fn decode_bytes(name: &str, bytes: &[u8]) -> Result<LayerImage, ImportError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| ImportError::Decode { name: name.to_owned(), source })?;
    Ok(Arc::new(decoded.to_rgba8()))
}

/// Decode one candidate file.
///
/// # Errors
///
/// Returns [`ImportError::Decode`] if the file contents are not a decodable image.
pub fn decode(file: &CandidateFile, source: ImportSource) -> Result<DecodedImage, ImportError> {
    let image = decode_bytes(&file.name, &file.bytes)?;
    Ok(DecodedImage { name: file.name.clone(), source, image })
}

/// Filter and decode a batch, yielding each result as soon as its decode completes.
pub fn decode_unordered(
    files: Vec<CandidateFile>,
    source: ImportSource,
) -> impl Stream<Item = Result<DecodedImage, ImportError>> + Unpin {
    decode_unordered_with(files, source, |file, source| async move {
        yield_now().await;
        decode(&file, source)
    })
}

/// Filter a batch and start one `run` future per accepted file.
///
/// Results come back in completion order.
pub fn decode_unordered_with<R, Fut>(
    files: Vec<CandidateFile>,
    source: ImportSource,
    mut run: R,
) -> impl Stream<Item = Result<DecodedImage, ImportError>> + Unpin
where
    R: FnMut(CandidateFile, ImportSource) -> Fut,
    Fut: Future<Output = Result<DecodedImage, ImportError>>,
{
    accept_images(files, source)
        .into_iter()
        .map(|file| run(file, source))
        .collect::<FuturesUnordered<_>>()
}

/// Return `Pending` once so the executor can run other work.
async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await;
}

/// Split a `data:<mime>;base64,<payload>` URL into its media type and bytes.
///
/// # Errors
///
/// Returns an error if the URL is malformed, not base64, not an image, or the
/// payload fails to decode.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), ImportError> {
    let rest = url.trim().strip_prefix("data:").ok_or(ImportError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImportError::MalformedDataUrl)?;
    let media_type = header.strip_suffix(";base64").ok_or(ImportError::NotBase64)?;
    if !is_image_media_type(media_type) {
        return Err(ImportError::NotImage(media_type.to_owned()));
    }
    let bytes = STANDARD.decode(payload.trim())?;
    Ok((media_type.to_owned(), bytes))
}

/// Decode a saved composition stored as a data URL.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or its image cannot be decoded.
pub fn decode_data_url(url: &str) -> Result<LayerImage, ImportError> {
    let (_, bytes) = parse_data_url(url)?;
    decode_bytes("saved composition", &bytes)
}
