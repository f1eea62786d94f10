//! Memory Management subsystem
//!
//! Page reclaim core: per-frame page descriptors, per-(cgroup, node)
//! lruvecs, and the multigenerational LRU that ages pages toward eviction.
//!
//! Fault handling, swap I/O and the reclaim scan loops are not here; they
//! call in through `Lruvec::add_page`, `Lruvec::del_page`,
//! `Lruvec::activate_page` and the `lru_gen` operations.

pub mod lru;
pub mod lru_gen;
pub mod page;
pub mod vma;
pub mod vmstat;

pub use lru::Lruvec;

/// Assert a memory-management invariant.
///
/// Callers must guarantee the condition; there is no recovery path. Checks
/// are active under the `debug_vm` feature (on by default) and compile to
/// nothing without it.
#[macro_export]
macro_rules! vm_bug_on {
    ($cond:expr) => {{
        #[cfg(feature = "debug_vm")]
        {
            if $cond {
                panic!(concat!("VM_BUG_ON(", stringify!($cond), ")"));
            }
        }
        #[cfg(not(feature = "debug_vm"))]
        {
            // type-check without evaluating
            let _ = || $cond;
        }
    }};
}
