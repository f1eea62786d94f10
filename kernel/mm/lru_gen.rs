//! Multigenerational LRU
//!
//! Instead of two lists per class, reclaimable pages are spread over a
//! sliding window of generations. A generation is a logical epoch: pages
//! in the same generation were last relevant at roughly the same time.
//! `max_seq` names the youngest generation and grows monotonically as the
//! aging path creates new generations; `min_seq` (one per class) trails it
//! as eviction empties the oldest.
//!
//! New pages are placed by expected reuse distance rather than always at
//! one end: faulted-in pages join the youngest generation, pages that
//! cannot be evicted right away join the second oldest, and immediately
//! evictable pages join the oldest. Within a generation, a saturating
//! usage counter sorts pages accessed through file descriptors into tiers.
//!
//! The generation tag lives in the page descriptor's state word and is
//! read and written with lock-free compare-exchange; every list or size
//! edit additionally requires the lruvec lock. For anything that still
//! reads the classic flags, the two youngest generations count as active.
//!
//! The aging path that advances the window is not part of this core; it
//! drives `advance_max_seq`/`try_advance_min_seq` from outside.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::mm::lru::{LruLists, Lruvec, PageRef};
use crate::mm::page::{
    LRU_GEN_MASK, LRU_GEN_PGOFF, LRU_GEN_WIDTH, LRU_TIER_FLAGS, LRU_USAGE_MASK, LRU_USAGE_PGOFF,
    LRU_USAGE_WIDTH, PG_ACTIVE, PG_REFERENCED, PG_UNEVICTABLE, PG_WORKINGSET,
};
use crate::mm::vma::{Vma, VM_LOCKED, VM_SPECIAL};
use crate::mm::vmstat::{LruList, ANON_AND_FILE, MAX_NR_ZONES};
use crate::vm_bug_on;

/// Maximum number of generations in the sliding window
pub const MAX_NR_GENS: usize = 4;

/// The window never shrinks below this many generations
pub const MIN_NR_GENS: usize = 2;

/// Number of usage tiers within a generation
pub const MAX_NR_TIERS: usize = 4;

// The generation field stores gen + 1, so the width must cover one value
// more than MAX_NR_GENS; the usage counter tops out one doubling short of
// the last tier.
const _: () = assert!(MAX_NR_GENS < (1 << LRU_GEN_WIDTH));
const _: () = assert!(LRU_USAGE_WIDTH as usize == MAX_NR_TIERS - 2);

/// Map a generation sequence number to a slot in the window
#[inline]
pub fn gen_from_seq(seq: u64) -> usize {
    (seq % MAX_NR_GENS as u64) as usize
}

/// Sliding-window metadata for one lruvec
///
/// The sequence counters are read without the lruvec lock (acquire loads);
/// advancing them is a structural change and takes the lock. The list and
/// size storage for each generation lives with the rest of the lruvec's
/// list state, under its lock.
pub struct LruGen {
    /// Sequence number of the youngest generation
    max_seq: AtomicU64,
    /// Oldest sequence still present, per page class
    min_seq: [AtomicU64; ANON_AND_FILE],
    /// Whether the generational scheme handles each class, fixed at
    /// construction
    enabled: [bool; ANON_AND_FILE],
}

impl LruGen {
    pub(super) fn new(enabled: [bool; ANON_AND_FILE]) -> Self {
        Self {
            max_seq: AtomicU64::new(MIN_NR_GENS as u64),
            min_seq: [AtomicU64::new(0), AtomicU64::new(0)],
            enabled,
        }
    }
}

impl Lruvec {
    /// Whether the generational scheme is active for any page class
    pub fn lru_gen_enabled(&self) -> bool {
        self.gen.enabled[0] || self.gen.enabled[1]
    }

    /// Whether the generational scheme handles the given class
    pub fn gen_enabled(&self, file: bool) -> bool {
        self.gen.enabled[file as usize]
    }

    /// Sequence number of the youngest generation
    pub fn max_seq(&self) -> u64 {
        self.gen.max_seq.load(Ordering::Acquire)
    }

    /// Oldest sequence number still present for a class
    pub fn min_seq(&self, file: bool) -> u64 {
        self.gen.min_seq[file as usize].load(Ordering::Acquire)
    }

    /// The youngest and the second youngest generations are considered
    /// active
    pub fn is_active_gen(&self, gen: usize) -> bool {
        let max_seq = self.max_seq();

        vm_bug_on!(max_seq == 0);
        vm_bug_on!(gen >= MAX_NR_GENS);

        gen == gen_from_seq(max_seq) || gen == gen_from_seq(max_seq - 1)
    }

    /// Update generation and legacy counters for one membership change
    ///
    /// `None` means "not on a generation list" on that side; at most one
    /// side may be `None`. Exactly one call per change. The `&mut` on the
    /// list state is the lruvec lock's guard, so the lock is necessarily
    /// held.
    fn gen_update_size(
        &self,
        lists: &mut LruLists,
        page: PageRef,
        old_gen: Option<usize>,
        new_gen: Option<usize>,
    ) {
        let file = page.is_file_lru();
        let class = file as usize;
        let zone = page.zonenum();
        let delta = page.nr_pages();

        vm_bug_on!(old_gen.is_none() && new_gen.is_none());
        vm_bug_on!(matches!(old_gen, Some(gen) if gen >= MAX_NR_GENS));
        vm_bug_on!(matches!(new_gen, Some(gen) if gen >= MAX_NR_GENS));

        if let Some(old) = old_gen {
            lists.gen_sizes[old][class][zone] -= delta;
        }
        if let Some(new) = new_gen {
            lists.gen_sizes[new][class][zone] += delta;
        }

        match (old_gen, new_gen) {
            (None, Some(new)) => {
                let lru = LruList::evictable(file, self.is_active_gen(new));
                self.update_lru_size(lru, zone, delta);
            }
            (Some(old), None) => {
                let lru = LruList::evictable(file, self.is_active_gen(old));
                self.update_lru_size(lru, zone, -delta);
            }
            (Some(old), Some(new)) => {
                // aging only moves pages toward the inactive side; the
                // active side only grows through reinsertion
                if !self.is_active_gen(old) && self.is_active_gen(new) {
                    self.update_lru_size(LruList::evictable(file, false), zone, -delta);
                    self.update_lru_size(LruList::evictable(file, true), zone, delta);
                }
                vm_bug_on!(self.is_active_gen(old) && !self.is_active_gen(new));
            }
            (None, None) => {}
        }
    }

    /// Add a page to a list of the multigenerational LRU
    ///
    /// Returns false, with no side effect, when the page is unevictable or
    /// the scheme is disabled for its class; the caller must use the
    /// classic path instead. Most callers go through `add_page`, which
    /// does exactly that.
    pub fn lru_gen_add(&self, page: PageRef, front: bool) -> bool {
        let mut lists = self.lists.lock();
        self.gen_add(&mut lists, page, front)
    }

    pub(super) fn gen_add(&self, lists: &mut LruLists, page: PageRef, front: bool) -> bool {
        let file = page.is_file_lru();
        let class = file as usize;
        let zone = page.zonenum();

        if page.is_unevictable() || !self.gen.enabled[class] {
            return false;
        }

        // A page being faulted in goes to the youngest generation.
        //
        // A page that can't be evicted immediately, i.e., an anon page not
        // yet in swap cache, a dirty page waiting on writeback, or a page
        // with workingset history but no fresh reference, goes to the
        // second oldest generation.
        //
        // A page that could be evicted immediately, i.e., deactivated,
        // rotated by writeback, or allocated for buffered io, goes to the
        // oldest generation.
        let seq = if page.is_active() {
            self.max_seq()
        } else if (!file && !page.is_swapcache())
            || (page.is_reclaim() && (page.is_dirty() || page.is_writeback()))
            || (!page.is_referenced() && page.is_workingset())
        {
            self.min_seq(file) + 1
        } else {
            self.min_seq(file)
        };
        let gen = gen_from_seq(seq);

        let res = page.update_flags(|old| {
            vm_bug_on!(old & LRU_GEN_MASK != 0);

            let mut new =
                (old & !(LRU_GEN_MASK | PG_ACTIVE)) | ((gen as u64 + 1) << LRU_GEN_PGOFF);
            // without a fresh reference the usage history starts over
            if old & PG_REFERENCED == 0 {
                new &= !(LRU_USAGE_MASK | LRU_TIER_FLAGS);
            }
            Some(new)
        });
        vm_bug_on!(res.is_err());

        self.gen_update_size(lists, page, None, Some(gen));
        let list = &mut lists.gen_lists[gen][class][zone];
        if front {
            list.push_front(page);
        } else {
            list.push_back(page);
        }

        true
    }

    /// Delete a page from a list of the multigenerational LRU
    ///
    /// Returns false when the page carries no generation tag (classic
    /// mode); the caller falls back to the classic path.
    pub fn lru_gen_del(&self, page: PageRef) -> bool {
        let mut lists = self.lists.lock();
        self.gen_del(&mut lists, page)
    }

    pub(super) fn gen_del(&self, lists: &mut LruLists, page: PageRef) -> bool {
        let old = match page.update_flags(|old| {
            if old & LRU_GEN_MASK == 0 {
                return None;
            }

            vm_bug_on!(old & PG_ACTIVE != 0);
            vm_bug_on!(old & PG_UNEVICTABLE != 0);

            let gen = (((old & LRU_GEN_MASK) >> LRU_GEN_PGOFF) - 1) as usize;
            let mut new = old & !LRU_GEN_MASK;
            // leaving a young generation keeps the page active for any
            // path still reading the classic flag
            if self.is_active_gen(gen) {
                new |= PG_ACTIVE;
            }
            Some(new)
        }) {
            Ok(old) => old,
            Err(_) => return false,
        };
        let gen = (((old & LRU_GEN_MASK) >> LRU_GEN_PGOFF) - 1) as usize;

        self.gen_update_size(lists, page, Some(gen), None);
        let class = page.is_file_lru() as usize;
        let zone = page.zonenum();
        let list = &mut lists.gen_lists[gen][class][zone];
        let pos = list.iter().position(|p| core::ptr::eq(*p, page));
        vm_bug_on!(pos.is_none());
        if let Some(pos) = pos {
            list.remove(pos);
        }

        true
    }

    /// Whether a page counts as active, under either scheme
    pub fn page_is_active(&self, page: PageRef) -> bool {
        match page.lru_gen() {
            None => page.is_active(),
            Some(gen) => {
                vm_bug_on!(page.is_active());
                vm_bug_on!(page.is_unevictable());

                self.is_active_gen(gen)
            }
        }
    }

    /// Account one access through a file descriptor
    ///
    /// The first access records the workingset marker; further accesses
    /// saturate the usage counter, never pushing the tier past
    /// `MAX_NR_TIERS - 1`. Increments commute with each other and with the
    /// structural writers, so any context may call this. With the
    /// generational scheme disabled this degrades to reading the classic
    /// active flag.
    pub fn inc_usage(&self, page: PageRef) -> bool {
        if !self.lru_gen_enabled() {
            return page.is_active();
        }

        let _ = page.update_flags(|old| {
            if old & PG_WORKINGSET == 0 {
                return Some(old | PG_WORKINGSET);
            }
            let usage = ((old & LRU_USAGE_MASK) + (1 << LRU_USAGE_PGOFF)).min(LRU_USAGE_MASK);
            Some((old & !LRU_USAGE_MASK) | usage)
        });

        true
    }

    /// Activate a page from page cache or swap cache after it's mapped
    ///
    /// A page refaulted without reference history would otherwise wait a
    /// full aging cycle before being recognized as hot. Mappings that
    /// reclaim must leave alone (mlocked, special, DAX) opt out.
    pub fn gen_activate(&self, page: PageRef, vma: &Vma) {
        if !self.lru_gen_enabled() {
            return;
        }

        if page.is_active()
            || page.is_unevictable()
            || vma.is_dax()
            || vma.flags & (VM_LOCKED | VM_SPECIAL) != 0
        {
            return;
        }

        self.activate_page(page);
    }

    // ========================================================================
    // Window advancement (driven by the external aging path)
    // ========================================================================

    /// Create a new youngest generation
    ///
    /// The caller decides when aging is due; this only moves the window
    /// and checks it never wraps past generations still in use. Legacy
    /// re-accounting of pages whose generation changes meaning is the
    /// aging path's business.
    pub fn advance_max_seq(&self) {
        let _lists = self.lists.lock();

        let max_seq = self.gen.max_seq.load(Ordering::Acquire);
        let next = max_seq + 1;
        let min_seq = self.min_seq(false).min(self.min_seq(true));
        vm_bug_on!(next - min_seq >= MAX_NR_GENS as u64);

        self.gen.max_seq.store(next, Ordering::Release);
    }

    /// Retire a class's oldest generation once eviction has emptied it
    ///
    /// Returns false when the oldest generation still holds pages or the
    /// window is already at its minimum depth.
    pub fn try_advance_min_seq(&self, file: bool) -> bool {
        let lists = self.lists.lock();
        let class = file as usize;

        let min_seq = self.gen.min_seq[class].load(Ordering::Acquire);
        let max_seq = self.gen.max_seq.load(Ordering::Acquire);
        if max_seq - min_seq + 1 <= MIN_NR_GENS as u64 {
            return false;
        }

        let gen = gen_from_seq(min_seq);
        for zone in 0..MAX_NR_ZONES {
            if !lists.gen_lists[gen][class][zone].is_empty() {
                return false;
            }
            vm_bug_on!(lists.gen_sizes[gen][class][zone] != 0);
        }

        self.gen.min_seq[class].store(min_seq + 1, Ordering::Release);
        true
    }

    // ========================================================================
    // Queries (reclaim scanner, aging heuristics, tests)
    // ========================================================================

    /// Recorded size of one generation bucket, in base pages
    pub fn gen_size(&self, gen: usize, file: bool, zone: usize) -> i64 {
        vm_bug_on!(gen >= MAX_NR_GENS);
        vm_bug_on!(zone >= MAX_NR_ZONES);

        self.lists.lock().gen_sizes[gen][file as usize][zone]
    }

    /// Pages actually linked on one generation bucket, in base pages
    pub fn gen_list_pages(&self, gen: usize, file: bool, zone: usize) -> i64 {
        vm_bug_on!(gen >= MAX_NR_GENS);
        vm_bug_on!(zone >= MAX_NR_ZONES);

        self.lists.lock().gen_lists[gen][file as usize][zone]
            .iter()
            .map(|page| page.nr_pages())
            .sum()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;

    use crate::mm::page::{
        tier_from_usage, PageDescriptor, PG_ANON, PG_DIRTY, PG_RECLAIM, PG_REFERENCED,
        PG_SWAPCACHE, PG_WORKINGSET,
    };
    use crate::mm::vmstat::NodeStats;

    fn gen_lruvec() -> (Lruvec, Arc<NodeStats>) {
        let node = Arc::new(NodeStats::new(0));
        let lruvec = Lruvec::new(Arc::clone(&node), None, [true, true]);
        (lruvec, node)
    }

    fn page(anon: bool, zone: u8) -> PageRef {
        let page = Box::leak(Box::new(PageDescriptor::new()));
        if anon {
            page.set_flag(PG_ANON);
        }
        page.set_zone(zone);
        page
    }

    #[test]
    fn test_active_page_lands_in_youngest_gen() {
        let (lruvec, node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_ACTIVE);
        p.set_order(1);

        lruvec.add_page(p);

        let young = gen_from_seq(lruvec.max_seq());
        assert_eq!(p.lru_gen(), Some(young));
        // the classic flag is replaced by the generation tag
        assert!(!p.is_active());
        assert!(lruvec.page_is_active(p));
        assert_eq!(lruvec.gen_size(young, true, 0), 2);
        assert_eq!(node.lru_pages(LruList::ActiveFile), 2);
    }

    #[test]
    fn test_anon_not_in_swapcache_lands_second_oldest() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(true, 0);

        lruvec.add_page(p);

        let second_oldest = gen_from_seq(lruvec.min_seq(false) + 1);
        assert_eq!(p.lru_gen(), Some(second_oldest));
        assert_ne!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(false))));
    }

    #[test]
    fn test_anon_in_swapcache_lands_oldest() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(true, 0);
        p.set_flag(PG_SWAPCACHE);

        // with a swap slot allocated the page is immediately evictable
        lruvec.add_page(p);

        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(false))));
    }

    #[test]
    fn test_reclaim_dirty_page_lands_second_oldest() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_RECLAIM | PG_DIRTY);

        lruvec.add_page(p);

        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(true) + 1)));
    }

    #[test]
    fn test_cold_file_page_lands_oldest() {
        let (lruvec, node) = gen_lruvec();
        let p = page(false, 2);

        lruvec.add_page(p);

        let oldest = gen_from_seq(lruvec.min_seq(true));
        assert_eq!(p.lru_gen(), Some(oldest));
        assert!(!lruvec.page_is_active(p));
        assert_eq!(node.lru_pages(LruList::InactiveFile), 1);
        assert_eq!(node.zone_lru_pages(2, LruList::InactiveFile), 1);
    }

    #[test]
    fn test_workingset_history_without_reference_ages_slower() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_WORKINGSET);
        let _ = p.update_flags(|old| Some(old | (2 << LRU_USAGE_PGOFF)));

        lruvec.add_page(p);

        // second oldest, and the stale usage history is wiped
        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(true) + 1)));
        assert!(!p.is_workingset());
        assert_eq!(p.tier_usage(), 0);
    }

    #[test]
    fn test_referenced_page_keeps_usage_history() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_REFERENCED | PG_WORKINGSET);
        let _ = p.update_flags(|old| Some(old | (1 << LRU_USAGE_PGOFF)));

        lruvec.add_page(p);

        // referenced and with history: immediately evictable slot, but the
        // tier record survives reinsertion
        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(true))));
        assert!(p.is_workingset());
        assert_eq!(p.tier_usage(), 2);
    }

    #[test]
    fn test_insert_remove_roundtrip() {
        let (lruvec, node) = gen_lruvec();
        let p = page(false, 1);

        lruvec.add_page(p);
        let gen = p.lru_gen().unwrap();
        assert_eq!(lruvec.gen_size(gen, true, 1), 1);

        lruvec.del_page(p);

        assert_eq!(p.lru_gen(), None);
        assert!(!p.is_on_lru());
        assert_eq!(lruvec.gen_size(gen, true, 1), 0);
        assert_eq!(lruvec.gen_list_pages(gen, true, 1), 0);
        for lru in [
            LruList::InactiveFile,
            LruList::ActiveFile,
            LruList::InactiveAnon,
            LruList::ActiveAnon,
        ] {
            assert_eq!(node.lru_pages(lru), 0);
        }
    }

    #[test]
    fn test_removal_from_young_gen_restores_active_flag() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_ACTIVE);

        lruvec.add_page(p);
        assert!(!p.is_active());

        lruvec.del_page(p);
        assert!(p.is_active());
        assert_eq!(p.lru_gen(), None);
    }

    #[test]
    fn test_removal_from_old_gen_leaves_inactive() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        lruvec.add_page(p);
        lruvec.del_page(p);

        assert!(!p.is_active());
    }

    #[test]
    fn test_disabled_class_falls_back() {
        let node = Arc::new(NodeStats::new(0));
        // file only
        let lruvec = Lruvec::new(Arc::clone(&node), None, [false, true]);

        let anon = page(true, 0);
        assert!(!lruvec.lru_gen_add(anon, true));
        assert_eq!(anon.lru_gen(), None);
        assert_eq!(node.lru_pages(LruList::InactiveAnon), 0);

        let file = page(false, 0);
        assert!(lruvec.lru_gen_add(file, true));
        assert!(file.lru_gen().is_some());
    }

    #[test]
    fn test_disabled_insert_leaves_counters_untouched() {
        let node = Arc::new(NodeStats::new(0));
        let lruvec = Lruvec::new(Arc::clone(&node), None, [false, false]);
        let p = page(false, 0);

        assert!(!lruvec.lru_gen_add(p, true));

        assert_eq!(p.lru_gen(), None);
        for gen in 0..MAX_NR_GENS {
            for zone in 0..MAX_NR_ZONES {
                assert_eq!(lruvec.gen_size(gen, true, zone), 0);
            }
        }
        assert_eq!(node.lru_pages(LruList::InactiveFile), 0);
    }

    #[test]
    fn test_unevictable_page_refused() {
        let (lruvec, node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_UNEVICTABLE);

        assert!(!lruvec.lru_gen_add(p, true));

        // the combined path routes it to the classic unevictable list
        lruvec.add_page(p);
        assert_eq!(p.lru_gen(), None);
        assert_eq!(node.lru_pages(LruList::Unevictable), 1);
    }

    #[test]
    fn test_del_without_generation_falls_back() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        assert!(!lruvec.lru_gen_del(p));
    }

    #[test]
    fn test_sizes_match_list_membership() {
        let (lruvec, _node) = gen_lruvec();

        let pages = [
            page(false, 0),
            page(false, 0),
            page(true, 1),
            page(false, 3),
        ];
        pages[1].set_order(2);
        pages[0].set_flag(PG_ACTIVE);

        for p in pages {
            lruvec.add_page(p);
        }

        for gen in 0..MAX_NR_GENS {
            for file in [false, true] {
                for zone in 0..MAX_NR_ZONES {
                    assert_eq!(
                        lruvec.gen_size(gen, file, zone),
                        lruvec.gen_list_pages(gen, file, zone),
                    );
                }
            }
        }
    }

    #[test]
    fn test_active_window_slides_with_max_seq() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        p.set_flag(PG_ACTIVE);

        lruvec.add_page(p);
        assert!(lruvec.page_is_active(p));

        // two new generations push the page out of the active window; the
        // oldest generations must retire before the window can move twice
        lruvec.advance_max_seq();
        assert!(lruvec.page_is_active(p));

        assert!(lruvec.try_advance_min_seq(false));
        assert!(lruvec.try_advance_min_seq(true));
        lruvec.advance_max_seq();
        assert!(!lruvec.page_is_active(p));
    }

    #[test]
    #[should_panic]
    fn test_max_seq_cannot_wrap_window() {
        let (lruvec, _node) = gen_lruvec();

        lruvec.advance_max_seq();
        // max_seq would land MAX_NR_GENS past min_seq
        lruvec.advance_max_seq();
    }

    #[test]
    fn test_min_seq_advance() {
        let (lruvec, _node) = gen_lruvec();

        // window holds three generations and the oldest is empty
        assert!(lruvec.try_advance_min_seq(false));
        assert_eq!(lruvec.min_seq(false), 1);

        // at minimum depth now
        assert!(!lruvec.try_advance_min_seq(false));

        // a resident page blocks retirement
        assert!(lruvec.try_advance_min_seq(true));
        let p = page(false, 0);
        lruvec.advance_max_seq();
        lruvec.add_page(p);
        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.min_seq(true))));
        assert!(!lruvec.try_advance_min_seq(true));
    }

    #[test]
    #[should_panic]
    fn test_double_insert_is_a_bug() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        assert!(lruvec.lru_gen_add(p, true));
        lruvec.lru_gen_add(p, true);
    }

    #[test]
    fn test_inc_usage_saturates_at_top_tier() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        assert_eq!(p.tier_usage(), 0);
        for _ in 0..10 {
            assert!(lruvec.inc_usage(p));
        }

        assert_eq!(p.tier_usage(), 4);
        assert_eq!(tier_from_usage(p.tier_usage()), MAX_NR_TIERS - 1);
    }

    #[test]
    fn test_inc_usage_first_access_sets_workingset() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        lruvec.inc_usage(p);
        assert!(p.is_workingset());
        assert_eq!(p.tier_usage(), 1);

        lruvec.inc_usage(p);
        assert_eq!(p.tier_usage(), 2);
    }

    #[test]
    fn test_inc_usage_disabled_reads_active_flag() {
        let node = Arc::new(NodeStats::new(0));
        let lruvec = Lruvec::new(node, None, [false, false]);
        let p = page(false, 0);

        assert!(!lruvec.inc_usage(p));
        assert!(!p.is_workingset());

        p.set_flag(PG_ACTIVE);
        assert!(lruvec.inc_usage(p));
        assert_eq!(p.tier_usage(), 0);
    }

    #[test]
    fn test_inc_usage_concurrent_increments_not_lost() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);

        std::thread::scope(|s| {
            s.spawn(|| lruvec.inc_usage(p));
            s.spawn(|| lruvec.inc_usage(p));
        });

        // one access set the marker, the other bumped the counter
        assert_eq!(p.tier_usage(), 2);

        std::thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    for _ in 0..50 {
                        lruvec.inc_usage(p);
                    }
                });
            }
        });
        assert_eq!(p.tier_usage(), 4);
    }

    #[test]
    fn test_gen_activate_promotes_cold_page() {
        let (lruvec, _node) = gen_lruvec();
        let p = page(false, 0);
        let vma = Vma::new(0x1000, 0x2000, 0);

        lruvec.add_page(p);
        assert!(!lruvec.page_is_active(p));

        lruvec.gen_activate(p, &vma);
        assert_eq!(p.lru_gen(), Some(gen_from_seq(lruvec.max_seq())));
        assert!(lruvec.page_is_active(p));
    }

    #[test]
    fn test_gen_activate_vma_opt_outs() {
        let (lruvec, _node) = gen_lruvec();

        for vma in [
            Vma::new(0, 0x1000, VM_LOCKED),
            Vma::new(0, 0x1000, VM_SPECIAL),
            Vma::new_dax(0, 0x1000, 0),
        ] {
            let p = page(false, 0);
            lruvec.add_page(p);
            let before = p.lru_gen();

            lruvec.gen_activate(p, &vma);
            assert_eq!(p.lru_gen(), before);
        }
    }

    #[test]
    fn test_gen_activate_disabled_is_noop() {
        let node = Arc::new(NodeStats::new(0));
        let lruvec = Lruvec::new(node, None, [false, false]);
        let p = page(false, 0);
        let vma = Vma::new(0, 0x1000, 0);

        lruvec.add_page(p);
        lruvec.gen_activate(p, &vma);

        assert!(!p.is_active());
        assert_eq!(p.lru_gen(), None);
    }

    #[test]
    fn test_construct_from_boot_options() {
        let opts = crate::cmdline::parse_cmdline("lru_gen=file");
        let node = Arc::new(NodeStats::new(0));
        let lruvec = Lruvec::new(node, None, opts.lru_gen.classes());

        assert!(lruvec.lru_gen_enabled());
        assert!(lruvec.gen_enabled(true));
        assert!(!lruvec.gen_enabled(false));
    }

    #[test]
    fn test_transfer_between_lruvecs() {
        let (src, src_node) = gen_lruvec();
        let (dst, dst_node) = gen_lruvec();
        let p = page(false, 0);

        src.add_page(p);
        assert_eq!(src_node.lru_pages(LruList::InactiveFile), 1);

        // removal then reinsertion is the only legal transfer
        src.del_page(p);
        dst.add_page(p);

        assert_eq!(src_node.lru_pages(LruList::InactiveFile), 0);
        assert_eq!(dst_node.lru_pages(LruList::InactiveFile), 1);
        assert!(p.lru_gen().is_some());
    }
}
