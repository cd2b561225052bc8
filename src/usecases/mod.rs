//! Application use cases. Orchestrate domain logic via ports.

pub mod capture_loop;
pub mod coordinator;
pub mod manual_override;
pub mod mode_switch;
pub mod session_lifecycle;

#[cfg(test)]
pub(crate) mod test_support;

pub use capture_loop::{BurstSettings, CaptureLoop, FrameBurst};
pub use coordinator::{CoordinatorSettings, CoordinatorView, SessionCoordinator};
pub use manual_override::ManualOverride;
pub use mode_switch::ModeSwitch;
pub use session_lifecycle::SessionLifecycle;
