//! Network join supervision: block until link-layer connectivity exists.
//!
//! The supervisor owns only the waiting contract. It polls a
//! [`LinkStatus`] source on a fixed interval, emits a progress dot per
//! failed check, and returns once a connected status has been observed at
//! least once. Association itself (driver bring-up, credential exchange)
//! runs elsewhere; see the `wifi` module.
//!
//! The stock policy is unbounded: the call either returns connected or
//! never returns, and recovery is left to an external power cycle. Hosted
//! callers can bound the wait instead and receive a typed
//! [`JoinOutcome::TimedOut`].

use embedded_hal_async::delay::DelayNs;

use crate::console::Console;

/// Source of the current link-layer connectivity status.
pub trait LinkStatus {
    /// Whether the link is up and usable for network traffic.
    fn is_up(&mut self) -> bool;
}

/// How long and how often to wait for the link to come up.
#[derive(Debug, Clone, Copy)]
pub struct JoinPolicy {
    /// Interval between status checks, in milliseconds.
    pub poll_interval_ms: u32,
    /// Maximum number of status checks, or `None` to wait forever.
    pub max_polls: Option<u32>,
}

impl JoinPolicy {
    /// Poll forever at the given interval (the stock device behavior).
    #[must_use]
    pub const fn unbounded(poll_interval_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            max_polls: None,
        }
    }

    /// Poll at most `max_polls` times at the given interval.
    #[must_use]
    pub const fn bounded(poll_interval_ms: u32, max_polls: u32) -> Self {
        Self {
            poll_interval_ms,
            max_polls: Some(max_polls),
        }
    }
}

/// Result of supervising a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A connected status was observed.
    Connected,
    /// The poll budget ran out before the link came up.
    TimedOut,
}

/// Blocks the caller until the network link is up.
pub struct JoinSupervisor {
    policy: JoinPolicy,
}

impl JoinSupervisor {
    /// Create a supervisor with the given poll policy.
    #[must_use]
    pub const fn new(policy: JoinPolicy) -> Self {
        Self { policy }
    }

    /// Wait for the link to come up, emitting progress to `console`.
    ///
    /// Checks `link` once per poll interval. Each failed check prints one
    /// dot; the first connected observation prints the success message and
    /// returns. With an unbounded policy this never returns `TimedOut`.
    pub async fn supervise<L, C, D>(
        &self,
        link: &mut L,
        console: &mut C,
        delay: &mut D,
    ) -> JoinOutcome
    where
        L: LinkStatus,
        C: Console,
        D: DelayNs,
    {
        console.progress("Connecting to Wi-Fi");
        let mut polls: u32 = 0;
        loop {
            polls = polls.saturating_add(1);
            if link.is_up() {
                console.line("");
                console.line("Wi-Fi connected");
                return JoinOutcome::Connected;
            }
            if let Some(max) = self.policy.max_polls
                && polls >= max
            {
                console.line("");
                return JoinOutcome::TimedOut;
            }
            console.progress(".");
            delay.delay_ms(self.policy.poll_interval_ms).await;
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::arithmetic_side_effects,
    clippy::unwrap_used,
    reason = "test code"
)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::delay::DelayNs;

    use super::{JoinOutcome, JoinPolicy, JoinSupervisor, LinkStatus};
    use crate::console::Console;

    struct ScriptedLink {
        polls_until_up: u32,
        checks: u32,
    }

    impl ScriptedLink {
        fn up_after(polls_until_up: u32) -> Self {
            Self {
                polls_until_up,
                checks: 0,
            }
        }
    }

    impl LinkStatus for ScriptedLink {
        fn is_up(&mut self) -> bool {
            self.checks += 1;
            self.checks > self.polls_until_up
        }
    }

    #[derive(Default)]
    struct RecordingConsole {
        lines: heapless::Vec<heapless::String<96>, 16>,
        dots: u32,
    }

    impl Console for RecordingConsole {
        fn line(&mut self, text: &str) {
            let mut owned = heapless::String::new();
            owned.push_str(text).unwrap();
            self.lines.push(owned).unwrap();
        }

        fn progress(&mut self, text: &str) {
            if text == "." {
                self.dots += 1;
            }
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
        calls: u32,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
            self.calls += 1;
        }
    }

    #[test]
    fn returns_after_connected_observation() {
        let supervisor = JoinSupervisor::new(JoinPolicy::unbounded(500));
        let mut link = ScriptedLink::up_after(3);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        let outcome = block_on(supervisor.supervise(&mut link, &mut console, &mut delay));

        assert_eq!(outcome, JoinOutcome::Connected);
        // 3 failed checks plus the one that observed connected
        assert_eq!(link.checks, 4);
        assert_eq!(console.dots, 3);
        assert_eq!(console.lines.last().unwrap().as_str(), "Wi-Fi connected");
    }

    #[test]
    fn immediate_link_skips_waiting() {
        let supervisor = JoinSupervisor::new(JoinPolicy::unbounded(500));
        let mut link = ScriptedLink::up_after(0);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        let outcome = block_on(supervisor.supervise(&mut link, &mut console, &mut delay));

        assert_eq!(outcome, JoinOutcome::Connected);
        assert_eq!(link.checks, 1);
        assert_eq!(console.dots, 0);
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn polls_wait_the_configured_interval() {
        let supervisor = JoinSupervisor::new(JoinPolicy::unbounded(500));
        let mut link = ScriptedLink::up_after(2);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        block_on(supervisor.supervise(&mut link, &mut console, &mut delay));

        assert_eq!(delay.total_ns, 2 * 500 * 1_000_000);
    }

    #[test]
    fn bounded_policy_times_out() {
        let supervisor = JoinSupervisor::new(JoinPolicy::bounded(500, 5));
        let mut link = ScriptedLink::up_after(u32::MAX);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        let outcome = block_on(supervisor.supervise(&mut link, &mut console, &mut delay));

        assert_eq!(outcome, JoinOutcome::TimedOut);
        assert_eq!(link.checks, 5);
    }
}
