//! Bounded wait for the chat SDK to become callable.
//!
//! The SDK loads asynchronously and may become ready before or after the
//! page's own load event.  Rather than nesting timers, both emitted scripts
//! use one small state machine: `waiting → ready | timed-out`.  The
//! predicate is checked immediately, then at a fixed interval (and on an
//! optional DOM event) until it holds or the deadline passes.  The machine
//! settles exactly once.
//!
//! [`WaitState::poll`] is the transition function; [`ReadinessWait::helper`]
//! renders the same machine as a browser function.

use std::time::Duration;

use crate::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Waiting,
    Ready,
    TimedOut,
}

impl WaitState {
    /// Advance the machine after one readiness check.  Terminal states are
    /// sticky: a late `ready` after a timeout changes nothing.
    pub fn poll(self, ready: bool, elapsed: Duration, policy: &ReadinessWait) -> Self {
        match self {
            Self::Waiting if ready => Self::Ready,
            Self::Waiting if elapsed >= policy.timeout => Self::TimedOut,
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::TimedOut => "timed-out",
        }
    }
}

/// Polling policy for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessWait {
    pub interval: Duration,
    pub timeout: Duration,
    /// DOM event on `window` that triggers an extra check when fired.
    pub event: Option<&'static str>,
}

impl ReadinessWait {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            event: None,
        }
    }

    pub fn with_event(mut self, event: &'static str) -> Self {
        self.event = Some(event);
        self
    }

    /// Upper bound on predicate evaluations from the timer alone
    /// (the immediate check plus one per interval until the deadline).
    pub fn max_checks(&self) -> u64 {
        let interval = self.interval.as_millis().max(1);
        (self.timeout.as_millis() / interval) as u64 + 1
    }

    /// Browser function `name(isReady, onReady, onTimeout)` implementing the
    /// machine.  Expects `warn` from the console prelude in scope.
    pub fn helper(&self, name: &str) -> String {
        let interval = self.interval.as_millis().max(1);
        let timeout = self.timeout.as_millis();
        let event = match self.event {
            Some(e) => escape::js_string(e),
            None => "null".into(),
        };
        format!(
            "\
function {name}(isReady, onReady, onTimeout) {{
  var state = '{waiting}', started = Date.now(), timer = null, unsubscribe = null;
  function settle(next) {{
    if (state !== '{waiting}') return;
    state = next;
    if (timer !== null) clearInterval(timer);
    if (unsubscribe) unsubscribe();
    try {{
      if (next === '{ready}') onReady(); else if (onTimeout) onTimeout();
    }} catch (e) {{
      warn('callback failed:', e);
    }}
  }}
  function check() {{
    var ok = false;
    try {{ ok = !!isReady(); }} catch (e) {{}}
    if (ok) settle('{ready}');
    else if (Date.now() - started >= {timeout}) settle('{timed_out}');
  }}
  var eventName = {event};
  if (eventName) {{
    var onEvent = function () {{ check(); }};
    window.addEventListener(eventName, onEvent);
    unsubscribe = function () {{ window.removeEventListener(eventName, onEvent); }};
  }}
  check();
  if (state === '{waiting}') timer = setInterval(check, {interval});
}}
",
            waiting = WaitState::Waiting.as_str(),
            ready = WaitState::Ready.as_str(),
            timed_out = WaitState::TimedOut.as_str(),
        )
    }
}
