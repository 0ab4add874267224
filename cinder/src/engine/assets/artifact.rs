//! On-disk container for a single [`Resource`].
//!
//! ```text
//! [magic "CNDR"][format version: u32 LE][header length: u32 LE][JSON header][bulk payload]
//! ```
//!
//! The header carries the id, name and resource data with every `#[serde(skip)]` field left
//! out. Those fields (texture pixels, mesh buffers) travel in the bulk payload.

use crate::engine::assets::{Resource, ResourceData, ResourceId};
use crate::utils::write_atomic;
use log::trace;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const ARTIFACT_MAGIC: [u8; 4] = *b"CNDR";
pub const ARTIFACT_VERSION: u32 = 1;

const PREAMBLE_LEN: usize = 12;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ArtifactError {
    #[snafu(display("Failed to read artifact {}: {source}", path.display()))]
    Read { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to write artifact {}: {source}", path.display()))]
    Write { path: PathBuf, source: io::Error },

    #[snafu(display("{} is not an artifact", path.display()))]
    BadMagic { path: PathBuf },

    #[snafu(display(
        "Artifact {} has format version {found}, expected {ARTIFACT_VERSION}",
        path.display()
    ))]
    Version { path: PathBuf, found: u32 },

    #[snafu(display("Artifact {} is truncated", path.display()))]
    Truncated { path: PathBuf },

    #[snafu(display("Artifact {} has an invalid header: {source}", path.display()))]
    Header {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Failed to encode artifact header for {name}: {source}"))]
    Encode {
        name: String,
        source: serde_json::Error,
    },

    #[snafu(display("Artifact {} has an invalid payload: {reason}", path.display()))]
    Bulk { path: PathBuf, reason: String },
}

#[derive(Serialize)]
struct HeaderRef<'a> {
    id: ResourceId,
    name: &'a str,
    data: &'a ResourceData,
}

#[derive(Deserialize)]
struct Header {
    id: ResourceId,
    name: String,
    data: ResourceData,
}

/// Encodes a resource into artifact bytes.
pub fn encode_artifact(resource: &Resource) -> Result<Vec<u8>, ArtifactError> {
    let header = serde_json::to_vec(&HeaderRef {
        id: resource.id,
        name: &resource.name,
        data: &resource.data,
    })
    .context(EncodeErr {
        name: resource.name.clone(),
    })?;
    let bulk = resource.data.bulk();

    let mut bytes = Vec::with_capacity(PREAMBLE_LEN + header.len() + bulk.len());
    bytes.extend_from_slice(&ARTIFACT_MAGIC);
    bytes.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&bulk);
    Ok(bytes)
}

/// Decodes artifact bytes. `path` is only used for error reporting.
pub fn decode_artifact(path: &Path, bytes: &[u8]) -> Result<Resource, ArtifactError> {
    ensure!(
        bytes.len() >= 4 && bytes[..4] == ARTIFACT_MAGIC,
        BadMagicErr { path }
    );
    ensure!(bytes.len() >= PREAMBLE_LEN, TruncatedErr { path });

    let version = read_u32(bytes, 4);
    ensure!(
        version == ARTIFACT_VERSION,
        VersionErr {
            path,
            found: version
        }
    );

    let header_len = read_u32(bytes, 8) as usize;
    let header_end = PREAMBLE_LEN + header_len;
    ensure!(bytes.len() >= header_end, TruncatedErr { path });

    let header: Header =
        serde_json::from_slice(&bytes[PREAMBLE_LEN..header_end]).context(HeaderErr { path })?;

    let mut data = header.data;
    data.restore_bulk(bytes[header_end..].to_vec())
        .map_err(|reason| ArtifactError::Bulk {
            path: path.to_path_buf(),
            reason,
        })?;

    Ok(Resource {
        id: header.id,
        name: header.name,
        data,
    })
}

pub fn save_artifact(resource: &Resource, path: &Path) -> Result<(), ArtifactError> {
    let bytes = encode_artifact(resource)?;
    write_atomic(path, &bytes).context(WriteErr { path })?;
    trace!("[Import] Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<Resource, ArtifactError> {
    let bytes = fs::read(path).context(ReadErr { path })?;
    decode_artifact(path, &bytes)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
