// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Guaranteed post-processing, whichever way a run ends.
//!
//! There is no removable process-exit hook to lean on, so the coordinator
//! is built from three simpler guarantees: a signal handler that only
//! raises a flag, the supervision loop polling that flag as one of its
//! termination conditions, and an atomic claim so post-processing runs
//! exactly once no matter how many paths race toward it.

use std::io;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use nix::libc;
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;

/// The byte on standard input that requests a graceful shutdown.
pub const END_OF_TEXT: u8 = 0x03;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INSTALL: Once = Once::new();

extern "C" fn raise_flag(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Coordinates the end of a run: observes external interrupts and hands
/// out the right to post-process exactly once.
pub struct ShutdownCoordinator {
    claimed: AtomicBool,
}

impl ShutdownCoordinator {
    /// Install the process-wide interrupt handler (once per process) and
    /// return a coordinator with an unclaimed post-processing slot.
    pub fn install() -> Self {
        INSTALL.call_once(|| {
            let action = SigAction::new(
                SigHandler::Handler(raise_flag),
                SaFlags::empty(),
                SigSet::empty(),
            );
            // only the flag store happens in the handler; everything else
            // waits for the supervision loop to notice
            unsafe {
                if let Err(err) = sigaction(Signal::SIGINT, &action) {
                    log::warn!("could not install SIGINT handler: {err}");
                }
                if let Err(err) = sigaction(Signal::SIGTERM, &action) {
                    log::warn!("could not install SIGTERM handler: {err}");
                }
            }
        });
        ShutdownCoordinator {
            claimed: AtomicBool::new(false),
        }
    }

    /// Whether an interrupt has been delivered to the process.
    pub fn interrupted(&self) -> bool {
        INTERRUPTED.load(Ordering::SeqCst)
    }

    /// Claim the right to run post-processing. True exactly once per
    /// coordinator; a caller that loses the claim must not post-process.
    pub fn try_claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::SeqCst)
    }
}

/// Whether an end-of-text byte is waiting on standard input.
///
/// Non-blocking by construction: an availability probe first, then reads
/// of what is already buffered. Consumes the bytes it inspects.
pub fn exit_requested() -> bool {
    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; 64];
    loop {
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        match poll(&mut fds, 0) {
            Ok(n) if n > 0 => {}
            _ => return false,
        }
        if !fds[0]
            .revents()
            .map_or(false, |r| r.contains(PollFlags::POLLIN))
        {
            return false;
        }
        match unistd::read(fd, &mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => {
                if buf[..n].contains(&END_OF_TEXT) {
                    return true;
                }
            }
        }
    }
}
