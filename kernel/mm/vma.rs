//! Virtual Memory Area (VMA) descriptor
//!
//! Describes a contiguous region of virtual memory in a process's address
//! space. The reclaim core consumes VMAs read-only: the activation path
//! checks a faulting mapping's flags before promoting a page.

// ============================================================================
// VMA flags (Linux bit positions)
// ============================================================================

/// Pages in this VMA are memory-locked (cannot be swapped out)
pub const VM_LOCKED: u32 = 0x2000;

/// Memory-mapped I/O or similar; no struct page behind the mapping
pub const VM_IO: u32 = 0x0000_4000;

/// Raw page-frame mapping without page descriptors
pub const VM_PFNMAP: u32 = 0x0000_0400;

/// Mapping may not be expanded with mremap
pub const VM_DONTEXPAND: u32 = 0x0004_0000;

/// Mapping mixes struct-page and raw frame ranges
pub const VM_MIXEDMAP: u32 = 0x1000_0000;

/// Mappings the page reclaim and unmap machinery must leave alone
pub const VM_SPECIAL: u32 = VM_IO | VM_DONTEXPAND | VM_PFNMAP | VM_MIXEDMAP;

/// Virtual Memory Area - describes a contiguous region of virtual memory
#[derive(Clone)]
pub struct Vma {
    /// Start address (page-aligned, inclusive)
    pub start: u64,
    /// End address (page-aligned, exclusive)
    pub end: u64,
    /// VM_* flags
    pub flags: u32,
    /// Backing store is DAX: pages are device-mapped, never cache-resident
    dax: bool,
}

impl Vma {
    /// Create a new VMA
    pub fn new(start: u64, end: u64, flags: u32) -> Self {
        Self {
            start,
            end,
            flags,
            dax: false,
        }
    }

    /// Create a VMA over a DAX-backed file
    pub fn new_dax(start: u64, end: u64, flags: u32) -> Self {
        Self {
            start,
            end,
            flags,
            dax: true,
        }
    }

    /// Check if address falls within this VMA
    #[inline]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Size of mapping in bytes
    #[inline]
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// Check if this VMA is memory-locked
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flags & VM_LOCKED != 0
    }

    /// Check if this VMA is off-limits to reclaim and unmap machinery
    #[inline]
    pub fn is_special(&self) -> bool {
        self.flags & VM_SPECIAL != 0
    }

    /// Check if this VMA maps DAX storage directly
    #[inline]
    pub fn is_dax(&self) -> bool {
        self.dax
    }
}

// ============================================================================
// Tests
// ============================================================================
