//! Kernel printk with buffering
//!
//! Implements Linux-style printk that always works: messages are stored in
//! a ring buffer regardless of whether a console has been attached, and
//! can be drained later for dmesg-like access.
//!
//! The buffer lock is held for the whole of a `printk!`/`printkln!`
//! invocation so that messages formatted from multiple arguments come out
//! atomically even when several CPUs log at once.

use core::fmt::{self, Write};

use spin::Mutex;

/// Ring buffer size (must be power of 2)
const PRINTK_BUFFER_SIZE: usize = 16384; // 16KB

/// Ring buffer for printk messages
struct RingBuffer {
    /// Buffer storage
    data: [u8; PRINTK_BUFFER_SIZE],
    /// Write position (next byte to write)
    head: usize,
    /// Read position (next byte to read when draining)
    tail: usize,
    /// Has the buffer wrapped (overwritten old data)?
    wrapped: bool,
}

impl RingBuffer {
    const fn new() -> Self {
        Self {
            data: [0; PRINTK_BUFFER_SIZE],
            head: 0,
            tail: 0,
            wrapped: false,
        }
    }

    /// Write a byte to the buffer
    fn write_byte(&mut self, byte: u8) {
        self.data[self.head] = byte;
        self.head = (self.head + 1) & (PRINTK_BUFFER_SIZE - 1);

        // If we caught up to tail, we've overwritten data
        if self.head == self.tail {
            self.tail = (self.tail + 1) & (PRINTK_BUFFER_SIZE - 1);
            self.wrapped = true;
        }
    }

    /// Write bytes to the buffer
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Read available bytes (advances tail)
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        while self.tail != self.head && count < buf.len() {
            buf[count] = self.data[self.tail];
            self.tail = (self.tail + 1) & (PRINTK_BUFFER_SIZE - 1);
            count += 1;
        }
        count
    }

    /// Get number of bytes available to read
    fn available(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            PRINTK_BUFFER_SIZE - self.tail + self.head
        }
    }

    /// Check if buffer has overflowed (lost messages)
    fn has_overflow(&self) -> bool {
        self.wrapped
    }
}

/// Global printk ring buffer
static PRINTK: Mutex<RingBuffer> = Mutex::new(RingBuffer::new());

/// Drain buffered messages into `buf`, returning the byte count
///
/// Used by the console attach path to flush early-boot messages, and by
/// dmesg-style readers.
pub fn drain(buf: &mut [u8]) -> usize {
    PRINTK.lock().read(buf)
}

/// Get printk buffer statistics: (bytes available, capacity, overflowed)
pub fn stats() -> (usize, usize, bool) {
    let buffer = PRINTK.lock();
    (
        buffer.available(),
        PRINTK_BUFFER_SIZE,
        buffer.has_overflow(),
    )
}

/// Printk writer for fmt::Write
///
/// Holds the buffer lock for its lifetime so a whole message is written
/// atomically.
pub struct PrintkWriter {
    guard: spin::MutexGuard<'static, RingBuffer>,
}

impl PrintkWriter {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            guard: PRINTK.lock(),
        }
    }
}

impl Write for PrintkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.guard.write_bytes(s.as_bytes());
        Ok(())
    }
}

/// Print to kernel log (like Linux printk)
///
/// Messages are buffered; always succeeds, never blocks on I/O.
#[macro_export]
macro_rules! printk {
    ($($arg:tt)*) => {{
        use ::core::fmt::Write;
        let mut writer = $crate::printk::PrintkWriter::new();
        let _ = write!(writer, $($arg)*);
        // writer dropped here, releasing the buffer lock
    }};
}

/// Print to kernel log with newline
///
/// Uses a single writer for the message and newline to ensure atomicity.
#[macro_export]
macro_rules! printkln {
    () => {
        $crate::printk!("\n")
    };
    ($($arg:tt)*) => {{
        use ::core::fmt::Write;
        let mut writer = $crate::printk::PrintkWriter::new();
        let _ = write!(writer, $($arg)*);
        let _ = writer.write_str("\n");
    }};
}

// ============================================================================
// Tests
// ============================================================================
