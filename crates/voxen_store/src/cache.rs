//! On-disk persistence for chunk voxel data, keyed by (world seed, chunk
//! coordinate).
//!
//! One lz4-compressed file per chunk, a small fixed header ahead of the
//! compressed cell bytes. Covers both the `Uniform` and `Dense` store
//! representations instead of always writing a full dense array.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use voxen_core::{VoxelError, VoxelId, VoxelResult};

use crate::voxel_store::VoxelStore;
use crate::zone::ChunkCoord;

/// On-disk format version. Bump when the header or payload layout changes.
const FORMAT_VERSION: u8 = 1;

/// Key identifying one persisted chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The world seed the chunk was generated (or edited) under.
    pub world_seed: u64,
    /// The chunk's coordinate.
    pub coord: ChunkCoord,
}

/// Persists [`VoxelStore`]s keyed by [`CacheKey`].
///
/// Implementations MAY apply any encoding; the core only depends on the
/// trait contract, not a specific format. A failed `get` is always treated
/// as a miss by the caller; a failed `put` is logged and dropped.
pub trait ChunkCache {
    /// Whether a value is present for `key`. Best-effort: a `false` here
    /// does not guarantee `get` would fail, and vice versa is not required
    /// either, but implementations should keep the two consistent.
    fn has(&self, key: CacheKey) -> bool;

    /// Reads the store for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::CacheIoError`] on any I/O or decoding failure.
    /// Returns `Ok(None)` for a clean miss.
    fn get(&self, key: CacheKey) -> VoxelResult<Option<VoxelStore>>;

    /// Writes `store` for `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::CacheIoError`] on failure.
    fn put(&self, key: CacheKey, store: &VoxelStore) -> VoxelResult<()>;

    /// Removes every entry for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::CacheIoError`] on failure.
    fn clear_seed(&self, seed: u64) -> VoxelResult<()>;

    /// Removes every entry for every seed.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::CacheIoError`] on failure.
    fn clear_all(&self) -> VoxelResult<()>;
}

/// A [`ChunkCache`] backed by one lz4-compressed file per chunk, under a
/// directory tree split by seed.
pub struct DirChunkCache {
    root: PathBuf,
}

impl DirChunkCache {
    /// Creates a cache rooted at `root`. Does not touch the filesystem until
    /// a read or write is performed.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn seed_dir(&self, seed: u64) -> PathBuf {
        self.root.join(format!("seed_{seed:016x}"))
    }

    fn path_for(&self, key: CacheKey) -> PathBuf {
        self.seed_dir(key.world_seed).join(format!(
            "chunk_{}_{}_{}.vxc",
            key.coord.cx, key.coord.cy, key.coord.cz
        ))
    }

    fn io_err(err: impl std::fmt::Display) -> VoxelError {
        VoxelError::CacheIoError(err.to_string())
    }
}

impl ChunkCache for DirChunkCache {
    fn has(&self, key: CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn get(&self, key: CacheKey) -> VoxelResult<Option<VoxelStore>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }

        let result = (|| {
            let mut file = fs::File::open(&path).map_err(Self::io_err)?;
            let mut compressed = Vec::new();
            file.read_to_end(&mut compressed).map_err(Self::io_err)?;
            let raw = lz4_flex::decompress_size_prepended(&compressed).map_err(Self::io_err)?;
            decode_chunk(&raw)
        })();

        if let Err(ref err) = result {
            let coord = key.coord;
            tracing::warn!(?coord, world_seed = key.world_seed, %err, "chunk cache read failed, treating as miss");
        }
        result.map(Some)
    }

    fn put(&self, key: CacheKey, store: &VoxelStore) -> VoxelResult<()> {
        let path = self.path_for(key);
        let result = (|| {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(Self::io_err)?;
            }
            let raw = encode_chunk(store);
            let compressed = lz4_flex::compress_prepend_size(&raw);
            let mut file = fs::File::create(&path).map_err(Self::io_err)?;
            file.write_all(&compressed).map_err(Self::io_err)
        })();

        if let Err(ref err) = result {
            let coord = key.coord;
            tracing::warn!(?coord, world_seed = key.world_seed, %err, "chunk cache write failed, dropping");
        }
        result
    }

    fn clear_seed(&self, seed: u64) -> VoxelResult<()> {
        let dir = self.seed_dir(seed);
        if dir.is_dir() {
            fs::remove_dir_all(&dir).map_err(Self::io_err)?;
        }
        Ok(())
    }

    fn clear_all(&self) -> VoxelResult<()> {
        if self.root.is_dir() {
            fs::remove_dir_all(&self.root).map_err(Self::io_err)?;
        }
        Ok(())
    }
}

/// Header preceding a chunk's cell payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    format_version: u8,
    is_uniform: bool,
    uniform_value: VoxelId,
    side: u32,
    height: u32,
}

const HEADER_LEN: usize = 1 + 1 + 1 + 4 + 4;

fn encode_chunk(store: &VoxelStore) -> Vec<u8> {
    match store {
        VoxelStore::Uniform(id) => {
            let header = Header { format_version: FORMAT_VERSION, is_uniform: true, uniform_value: *id, side: 0, height: 0 };
            encode_header(header)
        }
        VoxelStore::Dense { cells, side, height, .. } => {
            let header = Header {
                format_version: FORMAT_VERSION,
                is_uniform: false,
                uniform_value: 0,
                side: u32::try_from(*side).unwrap_or(0),
                height: u32::try_from(*height).unwrap_or(0),
            };
            let mut buf = encode_header(header);
            buf.extend_from_slice(cells);
            buf
        }
    }
}

fn encode_header(header: Header) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN);
    buf.push(header.format_version);
    buf.push(u8::from(header.is_uniform));
    buf.push(header.uniform_value);
    buf.extend_from_slice(&header.side.to_le_bytes());
    buf.extend_from_slice(&header.height.to_le_bytes());
    buf
}

fn decode_chunk(raw: &[u8]) -> VoxelResult<VoxelStore> {
    if raw.len() < HEADER_LEN {
        return Err(VoxelError::CacheIoError("chunk payload shorter than header".to_owned()));
    }

    let format_version = raw[0];
    if format_version != FORMAT_VERSION {
        return Err(VoxelError::CacheIoError(format!("unsupported chunk format version {format_version}")));
    }
    let is_uniform = raw[1] != 0;
    let uniform_value = raw[2];
    let side = u32::from_le_bytes([raw[3], raw[4], raw[5], raw[6]]) as usize;
    let height = u32::from_le_bytes([raw[7], raw[8], raw[9], raw[10]]) as usize;

    if is_uniform {
        return Ok(VoxelStore::uniform(uniform_value));
    }

    let payload = &raw[HEADER_LEN..];
    let expected = side * height * side;
    if payload.len() != expected {
        return Err(VoxelError::CacheIoError(format!(
            "expected {expected} cell bytes, found {}",
            payload.len()
        )));
    }

    let solid_count = payload.iter().filter(|&&c| c != 0).count();
    Ok(VoxelStore::Dense { cells: payload.to_vec().into_boxed_slice(), side, height, solid_count })
}
