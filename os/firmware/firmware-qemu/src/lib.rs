//! # QEMU Debug Console Output
//!
//! Early firmware has no console, no allocator and no serial driver yet.
//! QEMU's `-debugcon` device gives it one anyway: every byte written to I/O
//! port `0x402` shows up on the host.
//!
//! ```text
//! log::debug!(..) ──► QemuLogger ──► qemu_trace! ──► QemuSink ──► out 0x402
//! ```
//!
//! * [`QemuLogger`] routes the `log` facade to the port.
//! * [`qemu_trace!`] writes formatted text directly, bypassing `log`.
//!
//! With the `enabled` feature off (or on a non-x86 target) both compile down
//! to nothing. On real hardware the port is normally unclaimed and the
//! writes are ignored.
//!
//! ```bash
//! qemu-system-x86_64 -bios firmware.bin -debugcon stdio
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::QemuLogger;

#[cfg(all(feature = "enabled", target_arch = "x86_64"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};

    /// The port number for QEMU's debug port.
    const QEMU_DEBUG_PORT: u16 = 0x402;

    /// Write a single byte to QEMU's debug port.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn dbg_putc(c: u8) {
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") QEMU_DEBUG_PORT,
                in("al") c,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    pub struct QemuSink;

    impl Write for QemuSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(dbg_putc);
            Ok(())
        }
    }

    #[doc(hidden)]
    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best effort; the port cannot report failure.
        let _ = QemuSink.write_fmt(args);
    }
}

#[cfg(not(all(feature = "enabled", target_arch = "x86_64")))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn qemu_write(_: fmt::Arguments) {}
}

/// `format!`-style output straight to the debug console.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
