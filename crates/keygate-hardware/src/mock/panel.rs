//! Recording indicator panel.

use tracing::debug;

use crate::traits::IndicatorPanel;
use crate::types::Indicator;

/// Indicator panel that remembers every change.
///
/// Only real changes are recorded: switching on an indicator that is
/// already on leaves the log untouched.
///
/// # Examples
///
/// ```
/// use keygate_hardware::mock::MockPanel;
/// use keygate_hardware::traits::IndicatorPanel;
/// use keygate_hardware::Indicator;
///
/// let mut panel = MockPanel::new();
/// panel.set(Indicator::Status, true);
/// panel.set(Indicator::Status, true);
/// assert!(panel.is_on(Indicator::Status));
/// assert_eq!(panel.changes(), &[(Indicator::Status, true)]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockPanel {
    lit: [bool; Indicator::ALL.len()],
    changes: Vec<(Indicator, bool)>,
}

impl MockPanel {
    /// Create a panel with every indicator off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every change applied so far, oldest first.
    pub fn changes(&self) -> &[(Indicator, bool)] {
        &self.changes
    }

    /// Indicators currently lit.
    pub fn lit(&self) -> Vec<Indicator> {
        Indicator::ALL
            .into_iter()
            .filter(|indicator| self.lit[indicator.index()])
            .collect()
    }

    /// Forget the change log, keeping the current state.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }
}

impl IndicatorPanel for MockPanel {
    fn set(&mut self, indicator: Indicator, on: bool) {
        let slot = &mut self.lit[indicator.index()];
        if *slot != on {
            *slot = on;
            self.changes.push((indicator, on));
            debug!(%indicator, color = ?indicator.color(), on, "indicator changed");
        }
    }

    fn is_on(&self, indicator: Indicator) -> bool {
        self.lit[indicator.index()]
    }
}
