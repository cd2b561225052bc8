//! Entry/exit selection tagging captures and manual marks. No side effects.

use crate::domain::Mode;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
pub struct ModeSwitch {
    current: RwLock<Mode>,
}

impl ModeSwitch {
    pub fn new(initial: Mode) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub async fn current(&self) -> Mode {
        *self.current.read().await
    }

    pub async fn set(&self, mode: Mode) {
        let mut current = self.current.write().await;
        let previous = *current;
        *current = mode;
        if previous != mode {
            info!(from = %previous, to = %mode, "mode switched");
        }
    }

    /// Flip Entry/Exit and return the new mode.
    pub async fn toggle(&self) -> Mode {
        let mut current = self.current.write().await;
        let next = current.toggle();
        *current = next;
        info!(to = %next, "mode switched");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_to_entry_and_toggles() {
        let switch = ModeSwitch::default();
        assert_eq!(switch.current().await, Mode::Entry);
        assert_eq!(switch.toggle().await, Mode::Exit);
        assert_eq!(switch.toggle().await, Mode::Entry);
        switch.set(Mode::Exit).await;
        assert_eq!(switch.current().await, Mode::Exit);
    }
}
