use notify_rust::Notification;

const APP_NAME: &str = "PDV Bridge";

/// User-facing alerts raised outside of a request/response cycle.
pub trait Notifier: Send + Sync {
    /// Blocking-style alert: the operator must act before retrying.
    fn alert(&self, summary: &str, body: &str);
    fn info(&self, summary: &str, body: &str);
}

pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn alert(&self, summary: &str, body: &str) {
        log::warn!("{}: {}", summary, body);
        if let Err(e) = Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .timeout(0)
            .show()
        {
            log::debug!("Desktop notification failed: {}", e);
        }
    }

    fn info(&self, summary: &str, body: &str) {
        let _ = Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .timeout(3000)
            .show();
    }
}

/// Used when desktop notifications are disabled.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, summary: &str, body: &str) {
        log::warn!("{}: {}", summary, body);
    }

    fn info(&self, summary: &str, body: &str) {
        log::info!("{}: {}", summary, body);
    }
}

pub fn notifier(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(DesktopNotifier)
    } else {
        Box::new(LogNotifier)
    }
}
