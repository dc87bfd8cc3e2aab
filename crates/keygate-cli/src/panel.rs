//! Console rendering of the indicator panel.

use keygate_hardware::{Indicator, IndicatorPanel};
use tracing::debug;

/// Indicator panel that prints every change to stdout.
#[derive(Debug, Default)]
pub struct ConsolePanel {
    lit: [bool; Indicator::ALL.len()],
    quiet_blink: bool,
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not print status indicator changes (the password blink).
    pub fn quiet_blink(mut self, quiet: bool) -> Self {
        self.quiet_blink = quiet;
        self
    }

    fn render(&self) -> String {
        Indicator::ALL
            .iter()
            .map(|indicator| {
                let mark = if self.lit[indicator.index()] { '●' } else { '○' };
                format!("{mark} {:?}", indicator.color())
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

impl IndicatorPanel for ConsolePanel {
    fn set(&mut self, indicator: Indicator, on: bool) {
        let slot = &mut self.lit[indicator.index()];
        if *slot == on {
            return;
        }
        *slot = on;
        debug!(%indicator, on, "indicator changed");

        if !(self.quiet_blink && indicator == Indicator::Status) {
            println!("[{}]", self.render());
        }
    }

    fn is_on(&self, indicator: Indicator) -> bool {
        self.lit[indicator.index()]
    }
}
