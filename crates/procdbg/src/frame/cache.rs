//! Lazy variable cache with explicit dirty/fresh states.
//! - read: fetch-and-rebuild when dirty, serve cached entries otherwise
//! - invalidate: force a fetch on the next read

use crate::error::FetchError;

/// Whether the cached entries still reflect the debugger's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Next read must fetch.
    Dirty,
    /// Entries are the answer until the next invalidation.
    Fresh,
}

/// What a single read did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead {
    /// Served from the cache without fetching.
    Cached,
    /// Fetched and replaced the entries; carries the new length.
    Rebuilt(usize),
    /// Fetch failed; previous entries kept and the cache still marked fresh.
    Failed(FetchError),
}

#[derive(Debug)]
pub struct VariableCache<T> {
    state: CacheState,
    entries: Vec<T>,
    last_error: Option<FetchError>,
}

impl<T> Default for VariableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VariableCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CacheState::Dirty,
            entries: Vec::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.state = CacheState::Dirty;
    }

    /// Fetch when dirty. The entries are swapped only after the fetch has
    /// produced a complete list, and the state is fresh afterwards even if
    /// the fetch failed.
    pub fn read<F>(&mut self, fetch: F) -> CacheRead
    where
        F: FnOnce() -> Result<Vec<T>, FetchError>,
    {
        if self.state == CacheState::Fresh {
            return CacheRead::Cached;
        }
        let result = fetch();
        self.state = CacheState::Fresh;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.last_error = None;
                CacheRead::Rebuilt(self.entries.len())
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                CacheRead::Failed(err)
            }
        }
    }
}
