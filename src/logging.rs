//! Logging setup.
//!
//! Data-quality warnings tend to repeat for every record of a large file
//! (the same unknown vocabulary, the same missing subfield). The
//! [`DuplicateFilter`] layer lets each distinct warning through once.

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// A layer that drops warnings and errors whose message has been logged
/// before.
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    seen: Mutex<HashSet<String>>,
}

impl DuplicateFilter {
    /// A filter that has seen nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for DuplicateFilter {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let level = *event.metadata().level();
        if level != Level::WARN && level != Level::ERROR {
            return true;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // A poisoned lock only means another thread panicked mid-insert.
        let mut seen = match self.seen.lock() {
            Ok(seen) => seen,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.insert(visitor.message)
    }
}

/// Install the global subscriber.
///
/// `verbosity` 0 shows warnings, 1 adds progress, 2 adds filtered records,
/// 3 and up shows everything. `RUST_LOG` directives are honoured.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbosity: u8) -> Result<(), TryInitError> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(DuplicateFilter::new())
        .with(fmt_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{info, warn};

    struct Counter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for Counter {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn count_events(emit: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(DuplicateFilter::new())
            .with(Counter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, emit);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_repeated_warning_logged_once() {
        let n = count_events(|| {
            for _ in 0..3 {
                warn!("Found links to \"udc\" in field 080");
            }
            warn!("Found links to \"lcc\" in field 050");
        });
        assert_eq!(n, 2);
    }

    #[test]
    fn test_formatted_messages_compared_after_rendering() {
        let n = count_events(|| {
            for tag in ["080", "080", "089"] {
                warn!("Skipping link in field {tag}");
            }
        });
        assert_eq!(n, 2);
    }

    #[test]
    fn test_info_not_filtered() {
        let n = count_events(|| {
            for _ in 0..3 {
                info!("Read 500 records");
            }
        });
        assert_eq!(n, 3);
    }
}
