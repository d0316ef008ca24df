//! OS signal to engine-control mapping.
//!
//! | Signal | Control |
//! |--------|---------|
//! | `SIGHUP` | [`Control::Reload`] |
//! | `SIGUSR1` | [`Control::Pause`] |
//! | `SIGUSR2` | [`Control::Resume`] |
//! | `SIGINT` / `SIGTERM` / `SIGQUIT` | [`Control::Shutdown`] |
//!
//! Non-unix platforms only get Ctrl-C, mapped to [`Control::Shutdown`].

/// What the host should do with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Reload,
    Pause,
    Resume,
    Shutdown,
}

/// Signal listeners, registered once and polled from the main loop.
#[cfg(unix)]
pub struct Signals {
    hangup: tokio::signal::unix::Signal,
    user1: tokio::signal::unix::Signal,
    user2: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Registers the listeners.
    ///
    /// # Errors
    ///
    /// Returns `Err` if signal registration fails.
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            user1: signal(SignalKind::user_defined1())?,
            user2: signal(SignalKind::user_defined2())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    /// Waits for the next signal.
    pub async fn recv(&mut self) -> Control {
        tokio::select! {
            _ = self.hangup.recv() => Control::Reload,
            _ = self.user1.recv() => Control::Pause,
            _ = self.user2.recv() => Control::Resume,
            _ = self.interrupt.recv() => Control::Shutdown,
            _ = self.terminate.recv() => Control::Shutdown,
            _ = self.quit.recv() => Control::Shutdown,
        }
    }
}

/// Signal listeners, registered once and polled from the main loop.
#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    /// Registers the listeners.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches the unix signature.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    /// Waits for the next signal.
    pub async fn recv(&mut self) -> Control {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C listener failed");
            std::future::pending::<()>().await;
        }
        Control::Shutdown
    }
}
