//! Shared plot-history storage.
//!
//! Provides a thread-safe [`PlotStore`] holding the ordered page history of
//! one device. A single writer (the host's drawing thread, via the
//! [`Recorder`](crate::Recorder)) mutates it; HTTP handlers and renderers
//! read it concurrently through cheap point-in-time snapshots.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::page::{Page, PageId, PageStyle};
use crate::primitive::DrawingPrimitive;

/// Default maximum number of pages kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Compact status snapshot for change detection by polling clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Number of pages currently in history.
    pub hsize: usize,
    /// Update id, incremented once per committed mutation, never on read.
    pub upid: u64,
    /// Whether this device is the host's current plotting target.
    pub active: bool,
}

/// Selects a page either by stable identifier or by position relative to
/// the newest page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// Absolute page identifier (ids start at 1).
    Id(PageId),
    /// Offset from the newest page: `0` is the current page, `-1` the one
    /// before it, and so on.
    Relative(i64),
}

impl From<PageId> for PageSelector {
    fn from(id: PageId) -> Self {
        Self::Id(id)
    }
}

impl FromStr for PageSelector {
    type Err = PlotError;

    /// Parse a selector from a route string: a positive integer is an
    /// absolute id, zero or a negative integer is a relative offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .parse()
            .map_err(|_| PlotError::InvalidArgument(format!("invalid page selector: {s:?}")))?;
        if n >= 1 {
            #[allow(clippy::cast_sign_loss)]
            Ok(Self::Id(PageId(n as u64)))
        } else {
            Ok(Self::Relative(n))
        }
    }
}

impl std::fmt::Display for PageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Relative(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug)]
struct StoreInner {
    pages: VecDeque<Page>,
    next_id: u64,
    upid: u64,
    active: bool,
    finalized: bool,
}

/// Thread-safe, bounded page history of one device.
///
/// Cloning is cheap and shares the underlying history. All mutating
/// operations take the write lock only for the duration of the in-memory
/// structural change; rendering always happens outside the lock against a
/// page snapshot obtained from [`PlotStore::get`].
///
/// # Example
///
/// ```
/// use plotd_core::{PageStyle, PlotStore};
///
/// let store = PlotStore::new(8);
/// let id = store.new_page(PageStyle::default());
/// assert_eq!(store.snapshot().hsize, 1);
/// assert!(store.get(id.into()).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PlotStore {
    inner: Arc<RwLock<StoreInner>>,
    history_limit: usize,
    base_style: PageStyle,
}

impl PlotStore {
    /// Create an empty store keeping at most `history_limit` pages.
    ///
    /// A limit of 0 is treated as 1; the current page is never evicted out
    /// from under the host.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self::with_base_style(history_limit, PageStyle::default())
    }

    /// Create an empty store with the style used to seed pages created by
    /// [`PlotStore::clear`].
    #[must_use]
    pub fn with_base_style(history_limit: usize, base_style: PageStyle) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                pages: VecDeque::new(),
                next_id: 1,
                upid: 0,
                active: true,
                finalized: false,
            })),
            history_limit: history_limit.max(1),
            base_style,
        }
    }

    /// The configured maximum history size.
    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Append a primitive to the currently open page.
    ///
    /// The critical section is a single push; the host's drawing thread is
    /// never held across rendering or I/O.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::NoOpenPage`] if the device has been finalized
    /// or no page has been started yet.
    pub fn append(&self, primitive: DrawingPrimitive) -> PlotResult<()> {
        let mut inner = self.write();
        if inner.finalized {
            return Err(PlotError::NoOpenPage);
        }
        let Some(page) = inner.pages.back_mut().filter(|p| p.open) else {
            return Err(PlotError::NoOpenPage);
        };
        page.primitives.push(primitive);
        inner.upid += 1;
        Ok(())
    }

    /// Close the current page (if any) and open a fresh one.
    ///
    /// Evicts the oldest page when the history limit is exceeded and
    /// reopens a finalized device, so the host can keep plotting after a
    /// device-close signal was recorded.
    pub fn new_page(&self, style: PageStyle) -> PageId {
        let mut inner = self.write();
        if let Some(page) = inner.pages.back_mut() {
            page.open = false;
        }
        let id = PageId(inner.next_id);
        inner.next_id += 1;
        inner.pages.push_back(Page::new(id, style));
        while inner.pages.len() > self.history_limit {
            let evicted = inner.pages.pop_front();
            if let Some(page) = evicted {
                tracing::debug!(page = %page.id, "evicting oldest page from history");
            }
        }
        inner.finalized = false;
        inner.upid += 1;
        id
    }

    /// Get a snapshot of one page.
    ///
    /// The returned page is an owned copy; rendering it cannot observe
    /// later mutations and holds no lock.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::PageNotFound`] if the selector is out of range
    /// or the page has been evicted or removed.
    pub fn get(&self, selector: PageSelector) -> PlotResult<Page> {
        let inner = self.read();
        let index = Self::resolve(&inner, selector)?;
        Ok(inner.pages[index].clone())
    }

    /// Remove exactly one page from history.
    ///
    /// Surviving pages keep their identifiers; only their positions shift.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::PageNotFound`] if the selector does not match a
    /// page; the update id is left unchanged in that case.
    pub fn remove(&self, selector: PageSelector) -> PlotResult<PageId> {
        let mut inner = self.write();
        let index = Self::resolve(&inner, selector)?;
        let page = inner
            .pages
            .remove(index)
            .ok_or_else(|| PlotError::PageNotFound(selector.to_string()))?;
        inner.upid += 1;
        tracing::debug!(page = %page.id, "removed page");
        Ok(page.id)
    }

    /// Empty the history and reset to a single fresh open page.
    ///
    /// Always succeeds and always increments the update id.
    pub fn clear(&self) -> PageId {
        let mut inner = self.write();
        inner.pages.clear();
        let id = PageId(inner.next_id);
        inner.next_id += 1;
        inner.pages.push_back(Page::new(id, self.base_style.clone()));
        inner.finalized = false;
        inner.upid += 1;
        id
    }

    /// Finalize the device: close the current page and reject appends until
    /// the host starts a new page.
    pub fn close(&self) {
        let mut inner = self.write();
        if inner.finalized {
            return;
        }
        if let Some(page) = inner.pages.back_mut() {
            page.open = false;
        }
        inner.finalized = true;
        inner.upid += 1;
    }

    /// Mark whether this device is the host's current plotting target.
    pub fn set_active(&self, active: bool) {
        self.write().active = active;
    }

    /// Whether this device is the host's current plotting target.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read().active
    }

    /// Current status snapshot without copying any page contents.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.read();
        StateSnapshot {
            hsize: inner.pages.len(),
            upid: inner.upid,
            active: inner.active,
        }
    }

    /// Identifiers of all pages currently in history, oldest first.
    #[must_use]
    pub fn page_ids(&self) -> Vec<PageId> {
        self.read().pages.iter().map(|p| p.id).collect()
    }

    fn resolve(inner: &StoreInner, selector: PageSelector) -> PlotResult<usize> {
        let not_found = || PlotError::PageNotFound(selector.to_string());
        match selector {
            // Pages are sorted by id, so a binary search suffices.
            PageSelector::Id(id) => inner
                .pages
                .binary_search_by_key(&id, |p| p.id)
                .map_err(|_| not_found()),
            PageSelector::Relative(offset) => {
                let len = i64::try_from(inner.pages.len()).map_err(|_| not_found())?;
                let index = len - 1 + offset;
                if (0..len).contains(&index) {
                    #[allow(clippy::cast_sign_loss)]
                    Ok(index as usize)
                } else {
                    Err(not_found())
                }
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for PlotStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Style;

    fn line() -> DrawingPrimitive {
        DrawingPrimitive::Line {
            from: (0.0, 0.0),
            to: (1.0, 1.0),
            style: Style::default(),
        }
    }

    #[test]
    fn starts_empty_and_rejects_append() {
        let store = PlotStore::new(4);
        assert_eq!(store.snapshot().hsize, 0);
        assert!(matches!(store.append(line()), Err(PlotError::NoOpenPage)));
    }

    #[test]
    fn ids_are_dense_and_increasing() {
        let store = PlotStore::new(10);
        let ids: Vec<_> = (0..5)
            .map(|_| store.new_page(PageStyle::default()))
            .collect();
        assert_eq!(
            ids,
            vec![PageId(1), PageId(2), PageId(3), PageId(4), PageId(5)]
        );
        assert_eq!(store.page_ids(), ids);
    }

    #[test]
    fn eviction_drops_oldest_first() {
        let store = PlotStore::new(2);
        for _ in 0..3 {
            store.new_page(PageStyle::default());
        }
        assert_eq!(store.snapshot().hsize, 2);
        assert_eq!(store.page_ids(), vec![PageId(2), PageId(3)]);
        assert!(matches!(
            store.get(PageId(1).into()),
            Err(PlotError::PageNotFound(_))
        ));
    }

    #[test]
    fn append_goes_to_current_page() {
        let store = PlotStore::new(4);
        store.new_page(PageStyle::default());
        store.append(line()).expect("append");
        let id = store.new_page(PageStyle::default());
        store.append(line()).expect("append");
        store.append(line()).expect("append");

        let first = store.get(PageSelector::Relative(-1)).expect("first page");
        assert_eq!(first.len(), 1);
        assert!(!first.open);

        let current = store.get(id.into()).expect("current page");
        assert_eq!(current.len(), 2);
        assert!(current.open);
    }

    #[test]
    fn relative_and_absolute_selection_agree() {
        let store = PlotStore::new(8);
        for _ in 0..3 {
            store.new_page(PageStyle::default());
        }
        let by_rel = store.get(PageSelector::Relative(0)).expect("rel");
        let by_id = store.get(PageId(3).into()).expect("id");
        assert_eq!(by_rel.id, by_id.id);

        let back = store.get(PageSelector::Relative(-2)).expect("back");
        assert_eq!(back.id, PageId(1));
        assert!(store.get(PageSelector::Relative(-3)).is_err());
        assert!(store.get(PageSelector::Relative(1)).is_err());
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(
            "7".parse::<PageSelector>().expect("parse"),
            PageSelector::Id(PageId(7))
        );
        assert_eq!(
            "0".parse::<PageSelector>().expect("parse"),
            PageSelector::Relative(0)
        );
        assert_eq!(
            "-2".parse::<PageSelector>().expect("parse"),
            PageSelector::Relative(-2)
        );
        assert!("x".parse::<PageSelector>().is_err());
        assert!("1.5".parse::<PageSelector>().is_err());
    }

    #[test]
    fn upid_increments_on_mutation_only() {
        let store = PlotStore::new(4);
        let before = store.snapshot().upid;
        store.new_page(PageStyle::default());
        let after_page = store.snapshot().upid;
        assert!(after_page > before);

        // Reads do not bump the update id.
        let _ = store.get(PageSelector::Relative(0));
        let _ = store.snapshot();
        assert_eq!(store.snapshot().upid, after_page);

        store.append(line()).expect("append");
        assert!(store.snapshot().upid > after_page);
    }

    #[test]
    fn remove_missing_page_leaves_upid_unchanged() {
        let store = PlotStore::new(4);
        store.new_page(PageStyle::default());
        let before = store.snapshot();
        assert!(store.remove(PageId(99).into()).is_err());
        let after = store.snapshot();
        assert_eq!(after.upid, before.upid);
        assert_eq!(after.hsize, before.hsize);
    }

    #[test]
    fn remove_keeps_surviving_ids() {
        let store = PlotStore::new(8);
        for _ in 0..3 {
            store.new_page(PageStyle::default());
        }
        let before = store.snapshot();
        store.remove(PageId(2).into()).expect("remove");
        let after = store.snapshot();
        assert_eq!(after.hsize, before.hsize - 1);
        assert!(after.upid > before.upid);
        assert_eq!(store.page_ids(), vec![PageId(1), PageId(3)]);
    }

    #[test]
    fn clear_resets_to_single_fresh_page() {
        let store = PlotStore::new(8);
        for _ in 0..3 {
            store.new_page(PageStyle::default());
        }
        store.append(line()).expect("append");
        let before = store.snapshot();

        let id = store.clear();
        let after = store.snapshot();
        assert_eq!(after.hsize, 1);
        assert!(after.upid > before.upid);

        let page = store.get(id.into()).expect("fresh page");
        assert!(page.open);
        assert!(page.is_empty());
        // Identifiers are never reused.
        assert!(id > PageId(3));
    }

    #[test]
    fn close_rejects_appends_until_new_page() {
        let store = PlotStore::new(4);
        store.new_page(PageStyle::default());
        store.append(line()).expect("append");
        store.close();
        assert!(matches!(store.append(line()), Err(PlotError::NoOpenPage)));

        // A new-page signal reopens the device.
        store.new_page(PageStyle::default());
        store.append(line()).expect("append after reopen");
    }

    #[test]
    fn active_flag_round_trip() {
        let store = PlotStore::new(4);
        assert!(store.is_active());
        store.set_active(false);
        assert!(!store.is_active());
        assert!(!store.snapshot().active);
    }

    #[test]
    fn concurrent_readers_never_observe_torn_pages() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::thread;

        let store = PlotStore::new(16);
        store.new_page(PageStyle::default());
        let stop = Arc::new(AtomicBool::new(false));

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            let stop = Arc::clone(&stop);
            readers.push(thread::spawn(move || {
                let mut last_upid = 0;
                while !stop.load(Ordering::Relaxed) {
                    let snap = store.snapshot();
                    assert!(snap.upid >= last_upid, "update id went backwards");
                    last_upid = snap.upid;
                    if let Ok(page) = store.get(PageSelector::Relative(-1)) {
                        // A page observed as closed has a stable, complete
                        // primitive sequence: every fifth append is a marker
                        // circle, so counts must line up.
                        if !page.open {
                            let circles = page
                                .primitives
                                .iter()
                                .filter(|p| {
                                    matches!(p, DrawingPrimitive::Circle { .. })
                                })
                                .count();
                            assert_eq!(circles, page.len().div_ceil(5));
                        }
                    }
                }
            }));
        }

        for batch in 0..50 {
            for i in 0..10 {
                let prim = if i % 5 == 0 {
                    DrawingPrimitive::Circle {
                        center: (f64::from(batch), f64::from(i)),
                        radius: 1.0,
                        style: Style::default(),
                    }
                } else {
                    line()
                };
                store.append(prim).expect("append");
            }
            store.new_page(PageStyle::default());
        }

        stop.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }
}
