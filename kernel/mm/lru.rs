//! LRU page lists for page reclaim
//!
//! Each (memory cgroup, node) pair owns one `Lruvec` holding every
//! reclaimable page charged to that cgroup on that node. Two schemes share
//! the structure:
//!
//! - **Classic two-list**: pages sit on active/inactive lists per class
//!   plus an unevictable list. A page must be accessed twice to earn
//!   active-list protection ("second chance").
//!
//! - **Multigenerational**: pages sit on per-generation lists (see
//!   `lru_gen`), and the active/inactive distinction is derived from how
//!   young a page's generation is.
//!
//! `add_page`/`del_page` try the generational path first and fall back to
//! the classic lists, so callers never care which scheme is running. With
//! the generational scheme disabled the fallback makes this behave exactly
//! like a classic-only build.
//!
//! Lock ordering: the lruvec lock is a leaf spinlock, acquired after any
//! page-descriptor or allocator locks and never held across a blocking
//! call.

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::sync::Arc;

use spin::Mutex;

use crate::cgroup::memory::MemCgroup;
use crate::mm::lru_gen::{LruGen, MAX_NR_GENS};
use crate::mm::page::{PageDescriptor, PG_ACTIVE, PG_LRU};
use crate::mm::vmstat::{LruList, NodeStats, ANON_AND_FILE, MAX_NR_ZONES, NR_LRU_LISTS};
use crate::vm_bug_on;

/// List entries reference descriptors owned by the frame allocator; a
/// descriptor outlives any LRU membership.
pub type PageRef = &'static PageDescriptor;

/// Which LRU list should an evictable page be on?
///
/// Classic classifier; generational pages are placed by `lru_gen` instead.
pub fn page_lru(page: &PageDescriptor) -> LruList {
    vm_bug_on!(page.is_active() && page.is_unevictable());

    if page.is_unevictable() {
        return LruList::Unevictable;
    }
    LruList::evictable(page.is_file_lru(), page.is_active())
}

/// List membership and per-generation sizes, guarded by the lruvec lock
pub(super) struct LruLists {
    /// Classic active/inactive/unevictable membership
    pub(super) legacy: [VecDeque<PageRef>; NR_LRU_LISTS],
    /// Generation membership, indexed [gen][class][zone]
    pub(super) gen_lists: [[[VecDeque<PageRef>; MAX_NR_ZONES]; ANON_AND_FILE]; MAX_NR_GENS],
    /// Scaled page counts per generation bucket
    pub(super) gen_sizes: [[[i64; MAX_NR_ZONES]; ANON_AND_FILE]; MAX_NR_GENS],
}

impl LruLists {
    fn new() -> Self {
        Self {
            legacy: core::array::from_fn(|_| VecDeque::new()),
            gen_lists: core::array::from_fn(|_| {
                core::array::from_fn(|_| core::array::from_fn(|_| VecDeque::new()))
            }),
            gen_sizes: [[[0; MAX_NR_ZONES]; ANON_AND_FILE]; MAX_NR_GENS],
        }
    }
}

/// Per-(cgroup, node) LRU state
pub struct Lruvec {
    /// Node/zone aggregate counters this lruvec mirrors into
    node: Arc<NodeStats>,
    /// Owning cgroup's counters, when cgroup accounting is attached
    memcg: Option<Arc<MemCgroup>>,
    /// Generation window metadata; list storage lives in `lists`
    pub(super) gen: LruGen,
    /// Exclusive lock over all list membership and generation sizes
    pub(super) lists: Mutex<LruLists>,
}

impl Lruvec {
    /// Create an lruvec
    ///
    /// `gen_enabled` selects the generational scheme per page class
    /// (anon = 0, file = 1), typically from `BootOptions::lru_gen`. Both
    /// classes disabled yields a classic-only lruvec.
    pub fn new(
        node: Arc<NodeStats>,
        memcg: Option<Arc<MemCgroup>>,
        gen_enabled: [bool; ANON_AND_FILE],
    ) -> Self {
        Self {
            node,
            memcg,
            gen: LruGen::new(gen_enabled),
            lists: Mutex::new(LruLists::new()),
        }
    }

    /// Mirror a legacy-bucket change into node, zone and cgroup counters
    ///
    /// Called exactly once per membership change (twice for a change that
    /// moves a page between buckets).
    pub(super) fn update_lru_size(&self, lru: LruList, zone: usize, nr_pages: i64) {
        self.node.add_lru_pages(lru, zone, nr_pages);
        if let Some(memcg) = &self.memcg {
            memcg.update_lru_size(lru, zone, nr_pages);
        }
    }

    /// Add a page to the front of its list
    pub fn add_page(&self, page: PageRef) {
        let mut lists = self.lists.lock();
        self.add_page_locked(&mut lists, page, true);
    }

    /// Add a page to the tail of its list
    ///
    /// Used by rotation paths that want the page scanned last.
    pub fn add_page_tail(&self, page: PageRef) {
        let mut lists = self.lists.lock();
        self.add_page_locked(&mut lists, page, false);
    }

    pub(super) fn add_page_locked(&self, lists: &mut LruLists, page: PageRef, front: bool) {
        vm_bug_on!(page.is_on_lru());

        // classify before gen_add: assignment clears the active flag
        let lru = page_lru(page);

        if self.gen_add(lists, page, front) {
            page.set_flag(PG_LRU);
            return;
        }

        self.update_lru_size(lru, page.zonenum(), page.nr_pages());
        let list = &mut lists.legacy[lru as usize];
        if front {
            list.push_front(page);
        } else {
            list.push_back(page);
        }
        page.set_flag(PG_LRU);
    }

    /// Delete a page from this lruvec
    ///
    /// Must be called before a page is freed, changes zone or class, or
    /// transfers to another lruvec. During a transfer the caller keeps the
    /// page isolated so no one can observe it between deletion and
    /// reinsertion.
    pub fn del_page(&self, page: PageRef) {
        let mut lists = self.lists.lock();
        self.del_page_locked(&mut lists, page);
    }

    pub(super) fn del_page_locked(&self, lists: &mut LruLists, page: PageRef) {
        vm_bug_on!(!page.is_on_lru());

        if self.gen_del(lists, page) {
            page.clear_flag(PG_LRU);
            return;
        }

        let lru = page_lru(page);
        let list = &mut lists.legacy[lru as usize];
        let pos = list.iter().position(|p| core::ptr::eq(*p, page));
        vm_bug_on!(pos.is_none());
        if let Some(pos) = pos {
            list.remove(pos);
        }
        self.update_lru_size(lru, page.zonenum(), -page.nr_pages());
        page.clear_flag(PG_LRU);
    }

    /// Move a page to the head of the active set
    ///
    /// The shared activation routine: a page found hot is pulled off its
    /// current list and reinserted active, which under the generational
    /// scheme lands it in the youngest generation.
    pub fn activate_page(&self, page: PageRef) {
        let mut lists = self.lists.lock();

        if !page.is_on_lru() || page.is_active() || page.is_unevictable() {
            return;
        }

        self.del_page_locked(&mut lists, page);
        page.set_flag(PG_ACTIVE);
        self.add_page_locked(&mut lists, page, true);
    }

    /// Number of descriptors on one classic bucket
    pub fn lru_len(&self, lru: LruList) -> usize {
        self.lists.lock().legacy[lru as usize].len()
    }
}

// ============================================================================
// Tests
// ============================================================================
