//! Browser-console diagnostics for emitted scripts.
//!
//! Each script block declares `log` and `warn` once, gated by the debug
//! flag; the rest of the script calls them unconditionally.  With debug off
//! they are no-ops, so nothing reaches the console and nothing is ever sent
//! anywhere.

/// Debug-gated console logging helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLog {
    enabled: bool,
}

const PREFIX: &str = "[chatwoot]";

impl ConsoleLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// JavaScript declaring `log(...)` and `warn(...)` in the current scope.
    pub fn prelude(&self) -> String {
        if !self.enabled {
            return "var log = function () {}, warn = function () {};\n".into();
        }
        format!(
            "\
var log = function () {{
  try {{ console.log.apply(console, ['{PREFIX}'].concat([].slice.call(arguments))); }} catch (e) {{}}
}};
var warn = function () {{
  try {{ console.error.apply(console, ['{PREFIX}'].concat([].slice.call(arguments))); }} catch (e) {{}}
}};
"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_prelude_is_noop() {
        let p = ConsoleLog::new(false).prelude();
        assert!(!p.contains("console"));
        assert!(p.contains("var log = function () {}"));
    }

    #[test]
    fn enabled_prelude_wraps_console() {
        let p = ConsoleLog::new(true).prelude();
        assert!(p.contains("console.log.apply"));
        assert!(p.contains("console.error.apply"));
        assert!(p.contains("[chatwoot]"));
    }
}
