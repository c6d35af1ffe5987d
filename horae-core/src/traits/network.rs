//! Network trait for time resynchronization

use super::clock::Clock;
use super::InitError;

/// Trait for a network link able to fetch network time
///
/// Both operations block, but each implementation bounds them with its own
/// timeout and retry budget.
pub trait Network {
    /// Bring the network interface up (not associated yet)
    fn init(&mut self) -> Result<(), InitError>;

    /// Associate with an access point
    ///
    /// Returns `true` once connected.
    fn connect(&mut self, ssid: &str, credential: &str) -> bool;

    /// Fetch the time from `server` and write it into `clock`
    ///
    /// Polls until a plausible time arrives or the retry budget runs out.
    /// Returns `true` only if `clock` was updated. This is the only path
    /// that sets the clock during a cycle.
    fn sync_time<C: Clock>(&mut self, server: &str, clock: &mut C) -> bool;
}
