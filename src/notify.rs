//! User interaction seams: notifications and delete confirmations.
//!
//! The core never talks to a UI toolkit; it calls these traits and the
//! embedding shell decides how a toast or a confirm dialog looks.

/// Fire-and-forget, auto-dismissing user notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, is_error: bool);
}

/// Blocking yes/no confirmation.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Notifier that routes toasts to the log. Used by the headless binary.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, is_error: bool) {
        if is_error {
            log::error!("notice: {}", message);
        } else {
            log::info!("notice: {}", message);
        }
    }
}
