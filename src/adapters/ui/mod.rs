pub mod banner;
pub mod progress;
pub mod tui;

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once at startup (e.g. in main after tracing init).
pub fn init_ui(class_subject: &str) {
    banner::print_welcome(class_subject);
    tui::apply_theme();
}
