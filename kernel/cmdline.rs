//! Kernel command line parsing
//!
//! Parses kernel command line options into a `BootOptions` value that the
//! boot path hands to the subsystems it configures. Nothing here mutates
//! global state; lruvecs are constructed with the parsed enablement so
//! differently configured instances can coexist (and be tested side by
//! side).
//!
//! ## Supported Options
//!
//! - `lru_gen=<mode>` - Select the generational LRU scheme
//!   - `on`/`1`: both page classes (default)
//!   - `off`/`0`: classic two-list reclaim only
//!   - `file`: file-backed pages only
//!   - `anon`: anonymous pages only

use crate::printkln;

/// Generational LRU enablement from the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LruGenToggle {
    /// Both page classes use the generational scheme
    On,
    /// Classic two-list reclaim only
    Off,
    /// Only file-backed pages
    FileOnly,
    /// Only anonymous pages
    AnonOnly,
}

impl LruGenToggle {
    /// Per-class enablement, indexed anon = 0, file = 1
    ///
    /// This is the shape `Lruvec::new` takes.
    pub fn classes(self) -> [bool; 2] {
        match self {
            LruGenToggle::On => [true, true],
            LruGenToggle::Off => [false, false],
            LruGenToggle::FileOnly => [false, true],
            LruGenToggle::AnonOnly => [true, false],
        }
    }
}

/// Options applied at boot
#[derive(Clone, Copy, Debug)]
pub struct BootOptions {
    /// Generational LRU mode
    pub lru_gen: LruGenToggle,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            lru_gen: LruGenToggle::On,
        }
    }
}

/// Parse kernel command line options
///
/// Unknown options are ignored; unknown values for known options are
/// logged and keep their defaults.
pub fn parse_cmdline(cmdline: &str) -> BootOptions {
    let mut opts = BootOptions::default();

    for option in cmdline.split_whitespace() {
        if let Some(arg) = option.strip_prefix("lru_gen=") {
            match parse_lru_gen_option(arg) {
                Some(toggle) => {
                    opts.lru_gen = toggle;
                    printkln!("mm: multigenerational lru: {}", arg);
                }
                None => printkln!("mm: unknown lru_gen mode '{}', keeping default", arg),
            }
        }
        // Unknown options are ignored
    }

    opts
}

fn parse_lru_gen_option(arg: &str) -> Option<LruGenToggle> {
    match arg {
        "on" | "1" => Some(LruGenToggle::On),
        "off" | "0" => Some(LruGenToggle::Off),
        "file" => Some(LruGenToggle::FileOnly),
        "anon" => Some(LruGenToggle::AnonOnly),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
