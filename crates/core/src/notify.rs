use tracing::info;

/// Capability for delivering a user-facing notification.
///
/// The host platform (desktop shell, web frontend, test harness) supplies
/// the real delivery channel; the engine only ever calls this trait.
/// Permission negotiation with the platform is the host's concern — when
/// permission is denied or no channel exists, install [`LogNotifier`].
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Fire-and-forget: failures are the
    /// implementation's problem and must not surface into the engine.
    fn deliver(&self, title: &str, body: &str, icon: Option<&str>);
}

/// Fallback notifier that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, title: &str, body: &str, _icon: Option<&str>) {
        info!(title, body, "notification");
    }
}
