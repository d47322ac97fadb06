// src/platform/os/signals.rs

//! Process-wide shutdown signal handling.
//!
//! A KMS application owns the console; there is no window manager to deliver a
//! close request, so SIGINT/SIGTERM/SIGHUP/SIGQUIT are turned into a flag the
//! render loop polls.

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

const SHUTDOWN_SIGNALS: [Signal; 4] = [
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGHUP,
    Signal::SIGQUIT,
];

extern "C" fn handle_shutdown_signal(_signal: libc::c_int) {
    // Only async-signal-safe work here.
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Install the shutdown handler for all shutdown signals. Safe to call repeatedly.
pub fn install_shutdown_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_shutdown_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in SHUTDOWN_SIGNALS {
        // SAFETY: the handler only stores to an atomic.
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("Failed to install handler for {:?}", signal))?;
    }
    debug!("Shutdown signal handler installed");
    Ok(())
}

/// Whether a shutdown signal has arrived since startup.
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn it_should_flag_shutdown_when_a_handled_signal_is_raised() -> Result<()> {
        install_shutdown_handler()?;
        install_shutdown_handler()?;

        raise(Signal::SIGHUP)?;

        assert!(shutdown_requested());
        Ok(())
    }
}
