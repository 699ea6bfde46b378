//! Versioned, compressed save files.
//!
//! # Format
//!
//! ```text
//! offset  size  field
//! 0       4     magic "GKSV"
//! 4       4     format version, u32 little-endian
//! 8       32    BLAKE3 digest of the uncompressed payload
//! 40      ..    zlib-compressed payload
//! ```
//!
//! The payload is the world's [`WorldSnapshot`] encoded with `bincode`
//! (serde mode, standard config): every live entity in creation order with
//! its components (tagged by kind) and tags. The snapshot schema is explicit,
//! so the file does not depend on in-memory layout.
//!
//! # What Is NOT Serialized
//!
//! - **Change hooks**: loading restores into [`new_registry`], which
//!   registers them again.
//! - **UI state**: the state stack and config are not part of the world.
//!
//! Loading never runs change hooks. Derived tags such as mirrored positions
//! are stored verbatim and come back exactly as saved.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use gridkeep_ecs::prelude::{EntityId, WorldSnapshot};

use crate::components::{Component, SaveVersion};
use crate::tags::GameTag;
use crate::world_tools::{new_registry, GameWorld};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// File magic.
pub const MAGIC: [u8; 4] = *b"GKSV";

/// Default save file path.
pub const DEFAULT_SAVE_PATH: &str = "saved.sav";

/// Environment variable overriding [`DEFAULT_SAVE_PATH`].
pub const SAVE_PATH_ENV: &str = "GRIDKEEP_SAVE";

const HEADER_LEN: usize = 4 + 4 + 32;

type GameSnapshot = WorldSnapshot<Component, GameTag>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from saving or loading a world.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to access save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode world: {0}")]
    Encode(String),

    #[error("corrupt save data: {0}")]
    Deserialization(String),

    #[error("save format version {found} does not match expected version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

fn corrupt(details: impl Into<String>) -> SaveError {
    SaveError::Deserialization(details.into())
}

// ---------------------------------------------------------------------------
// Bytes
// ---------------------------------------------------------------------------

/// The save file path, honouring [`SAVE_PATH_ENV`].
pub fn default_save_path() -> PathBuf {
    std::env::var_os(SAVE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH))
}

/// Stamp the world with [`SAVE_VERSION`] and encode all of it.
///
/// # Errors
///
/// Returns [`SaveError::Encode`] if serialization or compression fails.
pub fn save_world(world: &mut GameWorld) -> Result<Vec<u8>, SaveError> {
    world.set(EntityId::WORLD, SaveVersion(SAVE_VERSION));
    let snapshot = world.capture_snapshot();

    let payload = bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())
        .map_err(|e| SaveError::Encode(e.to_string()))?;
    let digest = blake3::hash(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() / 2);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&SAVE_VERSION.to_le_bytes());
    out.extend_from_slice(digest.as_bytes());

    let mut encoder = ZlibEncoder::new(out, Compression::default());
    encoder
        .write_all(&payload)
        .map_err(|e| SaveError::Encode(e.to_string()))?;
    let out = encoder.finish().map_err(|e| SaveError::Encode(e.to_string()))?;

    tracing::debug!(
        entities = snapshot.entities.len(),
        payload_bytes = payload.len(),
        file_bytes = out.len(),
        "encoded world"
    );
    Ok(out)
}

/// Decode a world produced by [`save_world`].
///
/// # Errors
///
/// - [`SaveError::VersionMismatch`] if the header or the stamped
///   [`SaveVersion`] names a different format version.
/// - [`SaveError::Deserialization`] for anything malformed: bad magic,
///   truncation, checksum failure, undecodable payload, or a snapshot that
///   fails validation.
pub fn load_world(bytes: &[u8]) -> Result<GameWorld, SaveError> {
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!("file too short ({} bytes)", bytes.len())));
    }
    let (magic, rest) = bytes.split_at(4);
    if magic != MAGIC {
        return Err(corrupt("not a save file (bad magic)"));
    }
    let (version, rest) = rest.split_at(4);
    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(version);
    let found = u32::from_le_bytes(version_bytes);
    if found != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            found,
            expected: SAVE_VERSION,
        });
    }
    let (digest, compressed) = rest.split_at(32);

    let mut payload = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut payload)
        .map_err(|e| corrupt(format!("decompression failed: {e}")))?;
    if blake3::hash(&payload).as_bytes().as_slice() != digest {
        return Err(corrupt("checksum mismatch"));
    }

    let (snapshot, _): (GameSnapshot, usize) =
        bincode::serde::decode_from_slice(&payload, bincode::config::standard())
            .map_err(|e| corrupt(format!("undecodable payload: {e}")))?;

    let mut world = new_registry();
    world
        .restore_from_snapshot(&snapshot)
        .map_err(|e| corrupt(e.to_string()))?;

    match world.get::<SaveVersion>(EntityId::WORLD) {
        Some(&SaveVersion(stamped)) if stamped == SAVE_VERSION => {}
        Some(&SaveVersion(stamped)) => {
            return Err(SaveError::VersionMismatch {
                found: stamped,
                expected: SAVE_VERSION,
            })
        }
        None => return Err(corrupt("world carries no save version stamp")),
    }

    tracing::debug!(entities = world.entity_count(), "decoded world");
    Ok(world)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Save `world` to `path`, replacing any previous file.
///
/// The data is written to a sibling temporary file first and renamed into
/// place, so an interrupted save leaves the old file intact.
pub fn save_to_file(world: &mut GameWorld, path: &Path) -> Result<(), SaveError> {
    let bytes = save_world(world)?;
    let io_err = |source| SaveError::Io {
        path: path.to_owned(),
        source,
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, &bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved world");
    Ok(())
}

/// Load the world saved at `path`. A missing file is not an error and
/// yields `None`.
pub fn load_from_file(path: &Path) -> Result<Option<GameWorld>, SaveError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no save file, starting fresh");
            return Ok(None);
        }
        Err(source) => {
            return Err(SaveError::Io {
                path: path.to_owned(),
                source,
            })
        }
    };
    let world = load_world(&bytes)?;
    tracing::info!(path = %path.display(), entities = world.entity_count(), "loaded world");
    Ok(Some(world))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
