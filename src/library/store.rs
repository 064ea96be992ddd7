//! On-disk library cache keyed by source contents and curation parameters
//!
//! A built library is written as one PNG per tile plus a JSON manifest. The
//! manifest carries the key it was built for; any change to the source
//! folder, the filter gates or the normalization sizes produces a different
//! key and the library is rebuilt from scratch.

use crate::analysis::signature::ColorSignature;
use crate::io::configuration::{CACHE_MANIFEST, LibraryParams};
use crate::io::error::{MosaicError, Result, fs_error};
use crate::io::image::{ImageCodec, list_images, write_atomically, write_directory_atomically};
use crate::library::tiles::{Tile, TileId, TileLibrary};
use indicatif::ProgressBar;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Identity of a built library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryKey {
    /// Hex BLAKE3 digest of the source folder's file names and contents
    pub source_digest: String,
    /// Curation parameters the library was built with
    pub params: LibraryParams,
}

impl LibraryKey {
    /// Compute the key of `source` under `params`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `source` is missing or empty, or a
    /// file system error if a file cannot be read
    pub fn compute(source: &Path, params: &LibraryParams) -> Result<Self> {
        let mut hasher = blake3::Hasher::new();
        for path in list_images(source)? {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            let contents = std::fs::read(&path).map_err(fs_error(&path, "read"))?;
            digest_entry(&mut hasher, name.as_bytes(), &contents);
        }
        Ok(Self {
            source_digest: hasher.finalize().to_hex().to_string(),
            params: *params,
        })
    }
}

/// Feed one source file into the key digest
///
/// Name and contents are each prefixed with their little-endian `u64`
/// length, so no two folders share a byte stream.
pub fn digest_entry(hasher: &mut blake3::Hasher, name: &[u8], contents: &[u8]) {
    hasher.update(&(name.len() as u64).to_le_bytes());
    hasher.update(name);
    hasher.update(&(contents.len() as u64).to_le_bytes());
    hasher.update(contents);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    id: TileId,
    source: PathBuf,
    file: String,
    signature: ColorSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    key: LibraryKey,
    tiles: Vec<ManifestEntry>,
}

/// Directory holding one cached library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStore {
    root: PathBuf,
}

impl LibraryStore {
    /// Store rooted at `root` (created on first save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(CACHE_MANIFEST)
    }

    /// Load the cached library if it was built for `key`
    ///
    /// A missing, unreadable or mismatched manifest is a cache miss.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the manifest matches but a tile image is
    /// unreadable
    pub fn load<C: ImageCodec>(&self, key: &LibraryKey, codec: &C) -> Result<Option<TileLibrary>> {
        let manifest_path = self.manifest_path();
        let Ok(contents) = std::fs::read_to_string(&manifest_path) else {
            return Ok(None);
        };

        let manifest: Manifest = match serde_json::from_str(&contents) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Ignoring unreadable library cache '{}': {e}", manifest_path.display());
                return Ok(None);
            }
        };

        if manifest.key != *key {
            info!("Library cache key changed, rebuilding");
            return Ok(None);
        }

        let tiles = manifest
            .tiles
            .into_iter()
            .map(|entry| -> Result<Tile> {
                let pixels = codec.load(&self.root.join(&entry.file))?;
                Ok(Tile {
                    id: entry.id,
                    source: entry.source,
                    pixels,
                    signature: entry.signature,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(TileLibrary::from_tiles(tiles)))
    }

    /// Replace the cached library with `library`, built for `key`
    ///
    /// # Errors
    ///
    /// Returns an encode or file system error if any part cannot be written;
    /// a previous cache is left untouched in that case
    pub fn save<C: ImageCodec>(&self, key: &LibraryKey, library: &TileLibrary, codec: &C) -> Result<()> {
        write_directory_atomically(&self.root, |staging| {
            let mut entries = Vec::with_capacity(library.len());
            for tile in library.tiles() {
                let file = format!("tile_{:05}.png", tile.id.0);
                codec.save(&tile.pixels, &staging.join(&file))?;
                entries.push(ManifestEntry {
                    id: tile.id,
                    source: tile.source.clone(),
                    file,
                    signature: tile.signature,
                });
            }

            let manifest = Manifest {
                key: key.clone(),
                tiles: entries,
            };
            let manifest_path = staging.join(CACHE_MANIFEST);
            let json = serde_json::to_string_pretty(&manifest).map_err(|e| MosaicError::Cache {
                path: manifest_path.clone(),
                source: e,
            })?;
            write_atomically(&manifest_path, |writer| {
                writer
                    .write_all(json.as_bytes())
                    .map_err(fs_error(&manifest_path, "write"))
            })
        })
    }

    /// Reuse the cached library for `source` or build and cache a new one
    ///
    /// # Errors
    ///
    /// Propagates build errors and cache write errors
    pub fn load_or_build<C: ImageCodec>(
        &self,
        source: &Path,
        params: &LibraryParams,
        codec: &C,
        progress: Option<&ProgressBar>,
    ) -> Result<TileLibrary> {
        let key = LibraryKey::compute(source, params)?;
        if let Some(library) = self.load(&key, codec)? {
            info!("Reusing cached tile library ({} tiles)", library.len());
            return Ok(library);
        }

        let library = TileLibrary::build(source, params, codec, progress)?;
        self.save(&key, &library, codec)?;
        Ok(library)
    }
}
