use super::{EntryList, Store};
use crate::entry::CacheEntry;
use crate::error::{BuildError, CacheError, Result};
use crate::policy::EvictionPolicy;
use crate::time;

use core::fmt;
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bincode::Options;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Bumped whenever the on-disk layout changes. Images with another version
/// are treated as empty.
const FORMAT_VERSION: u32 = 1;

/// The serialized form written to the backing file.
#[derive(Serialize)]
struct ImageRef<'a, K, V> {
  version: u32,
  entries: &'a VecDeque<CacheEntry<K, V>>,
}

#[derive(Deserialize)]
struct Image<K, V> {
  version: u32,
  entries: VecDeque<CacheEntry<K, V>>,
}

fn encode_into<W: Write, K: Serialize, V: Serialize>(
  writer: W,
  image: &ImageRef<'_, K, V>,
) -> bincode::Result<()> {
  bincode::DefaultOptions::new().serialize_into(writer, image)
}

/// Decodes an image, refusing any length prefix larger than `limit` bytes so
/// a corrupt file cannot trigger a huge allocation.
fn decode_from<R: Read, K: DeserializeOwned, V: DeserializeOwned>(
  reader: R,
  limit: u64,
) -> bincode::Result<Image<K, V>> {
  bincode::DefaultOptions::new()
    .with_limit(limit)
    .deserialize_from(reader)
}

/// A store that keeps its ordered sequence serialized in a single file.
///
/// Every operation loads the full sequence, sweeps expired entries, applies
/// its change and writes the sequence back if anything changed, all under the
/// store's lock. The number of entries is always derived from the loaded
/// sequence.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a failed write never leaves a truncated file behind. A
/// file that cannot be read or decoded is treated as an empty store.
///
/// The file format is bincode and is only guaranteed to round-trip within the
/// same version of this crate.
pub struct PersistentStore<K, V> {
  path: PathBuf,
  lock: Mutex<()>,
  policy: Arc<dyn EvictionPolicy<K, V>>,
  ttl: Duration,
  _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> fmt::Debug for PersistentStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PersistentStore")
      .field("path", &self.path)
      .field("ttl", &self.ttl)
      .finish_non_exhaustive()
  }
}

impl<K, V> PersistentStore<K, V> {
  /// Opens (creating if needed) the store backed by the file at `path`.
  ///
  /// Missing parent directories are created. Entries already in the file are
  /// kept and become visible through the new store.
  pub fn open<P>(
    path: impl Into<PathBuf>,
    policy: P,
    ttl: Duration,
  ) -> std::result::Result<Self, BuildError>
  where
    P: EvictionPolicy<K, V> + 'static,
  {
    Self::with_shared_policy(path.into(), Arc::new(policy), ttl)
  }

  pub(crate) fn with_shared_policy(
    path: PathBuf,
    policy: Arc<dyn EvictionPolicy<K, V>>,
    ttl: Duration,
  ) -> std::result::Result<Self, BuildError> {
    if ttl.as_millis() == 0 {
      return Err(BuildError::ZeroTimeToLive);
    }

    let storage_error = |err: io::Error| BuildError::Storage {
      path: path.clone(),
      reason: err.to_string(),
    };
    if let Some(parent) = parent_dir(&path) {
      fs::create_dir_all(parent).map_err(storage_error)?;
    }
    OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .map_err(storage_error)?;

    Ok(Self {
      path,
      lock: Mutex::new(()),
      policy,
      ttl,
      _marker: PhantomData,
    })
  }

  /// The backing file.
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl<K, V> PersistentStore<K, V>
where
  K: Serialize + DeserializeOwned,
  V: Serialize + DeserializeOwned,
{
  /// Runs `f` on the swept sequence and persists the result if it changed.
  ///
  /// If the write fails the file keeps its previous content and the error is
  /// returned instead of `f`'s outcome.
  fn transact<R>(&self, f: impl FnOnce(&mut EntryList<K, V>) -> R) -> Result<R> {
    let _guard = self.lock.lock();
    let mut entries = EntryList::from_items(self.load());
    entries.sweep(time::now_millis());
    let outcome = f(&mut entries);
    if entries.is_dirty() {
      self.save(entries.items())?;
    }
    Ok(outcome)
  }

  fn load(&self) -> VecDeque<CacheEntry<K, V>> {
    let file = match File::open(&self.path) {
      Ok(file) => file,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return VecDeque::new(),
      Err(err) => {
        tracing::warn!(path = %self.path.display(), error = %err, "cannot read cache file, treating it as empty");
        return VecDeque::new();
      }
    };
    let len = file.metadata().map_or(0, |meta| meta.len());
    if len == 0 {
      return VecDeque::new();
    }

    match decode_from::<_, K, V>(BufReader::new(file), len) {
      Ok(image) if image.version == FORMAT_VERSION => {
        tracing::trace!(path = %self.path.display(), entries = image.entries.len(), "loaded cache file");
        image.entries
      }
      Ok(image) => {
        tracing::warn!(
          path = %self.path.display(),
          found = image.version,
          expected = FORMAT_VERSION,
          "unsupported cache file version, treating it as empty"
        );
        VecDeque::new()
      }
      Err(err) => {
        tracing::warn!(path = %self.path.display(), error = %err, "corrupt cache file, treating it as empty");
        VecDeque::new()
      }
    }
  }

  fn save(&self, entries: &VecDeque<CacheEntry<K, V>>) -> Result<()> {
    let persist_error = |source: io::Error| CacheError::Persist {
      path: self.path.clone(),
      source,
    };

    let dir = parent_dir(&self.path).unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(persist_error)?;
    {
      let mut writer = BufWriter::new(&mut temp);
      let image = ImageRef {
        version: FORMAT_VERSION,
        entries,
      };
      encode_into(&mut writer, &image)?;
      writer.flush().map_err(persist_error)?;
    }
    temp.as_file().sync_all().map_err(persist_error)?;
    temp.persist(&self.path).map_err(|err| persist_error(err.error))?;

    tracing::trace!(path = %self.path.display(), entries = entries.len(), "rewrote cache file");
    Ok(())
  }
}

fn parent_dir(path: &Path) -> Option<&Path> {
  path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

impl<K, V> Store<K, V> for PersistentStore<K, V>
where
  K: Eq + Clone + Serialize + DeserializeOwned + Send,
  V: Clone + Serialize + DeserializeOwned + Send,
{
  fn add(&self, key: K, value: V) -> Result<()> {
    let entry = CacheEntry::new(key, value, self.ttl);
    self.transact(|entries| entries.upsert(entry))
  }

  fn add_first(&self, entry: CacheEntry<K, V>) -> Result<()> {
    self.transact(|entries| entries.push_front(entry))
  }

  fn add_last(&self, entry: CacheEntry<K, V>) -> Result<()> {
    self.transact(|entries| entries.push_back(entry))
  }

  fn remove_first(&self) -> Result<CacheEntry<K, V>> {
    self
      .transact(|entries| entries.pop_front())?
      .ok_or(CacheError::EmptyStore)
  }

  fn remove_last(&self) -> Result<CacheEntry<K, V>> {
    self
      .transact(|entries| entries.pop_back())?
      .ok_or(CacheError::EmptyStore)
  }

  fn remove(&self, key: &K) -> Result<Option<CacheEntry<K, V>>> {
    self.transact(|entries| entries.remove(key))
  }

  fn get(&self, key: &K) -> Result<Option<V>> {
    self.transact(|entries| entries.touch(key, &*self.policy))
  }

  fn index_of(&self, key: &K) -> Result<Option<usize>> {
    self.transact(|entries| entries.position(key))
  }

  fn size(&self) -> Result<usize> {
    self.transact(|entries| entries.len())
  }

  fn clear(&self) -> Result<()> {
    let _guard = self.lock.lock();
    self.save(&VecDeque::new())
  }

  fn remove_expired(&self) -> Result<usize> {
    let _guard = self.lock.lock();
    let mut entries = EntryList::from_items(self.load());
    let removed = entries.sweep(time::now_millis());
    if entries.is_dirty() {
      self.save(entries.items())?;
    }
    Ok(removed)
  }

  fn entries(&self) -> Result<Vec<CacheEntry<K, V>>> {
    self.transact(|entries| entries.to_vec())
  }

  fn ttl(&self) -> Duration {
    self.ttl
  }
}
