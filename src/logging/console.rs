//! Mirror of log events onto the host console

use std::cell::Cell;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Destination for console lines
pub trait ConsoleSink: Send + Sync + 'static {
    fn is_ready(&self) -> bool;
    fn write(&self, text: &[u16]);
}

/// Writes through the bound hook once the host console exists
#[derive(Debug, Clone, Copy, Default)]
pub struct HostConsole;

impl ConsoleSink for HostConsole {
    fn is_ready(&self) -> bool {
        crate::gate::is_console_ready()
    }

    fn write(&self, text: &[u16]) {
        crate::gate::uconsole_output_text(text);
    }
}

thread_local! {
    static WRITING: Cell<bool> = const { Cell::new(false) };
}

/// Layer forwarding events at or above `threshold` to a [`ConsoleSink`]
///
/// Events raised while a line is being written (e.g. by the host's console
/// routine logging through us) are dropped.
pub struct ConsoleLayer<S = HostConsole> {
    sink: S,
    threshold: Level,
}

impl<S: ConsoleSink> ConsoleLayer<S> {
    pub fn new(sink: S, threshold: Level) -> Self {
        Self { sink, threshold }
    }
}

impl<S, Sub> Layer<Sub> for ConsoleLayer<S>
where
    S: ConsoleSink,
    Sub: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, Sub>) {
        let level = *event.metadata().level();
        if level > self.threshold || !self.sink.is_ready() {
            return;
        }
        if WRITING.with(Cell::get) {
            return;
        }

        let mut line = LineVisitor::default();
        event.record(&mut line);
        let text = format!("[{level}] {}\n", line.finish());
        let wide: Vec<u16> = text.encode_utf16().collect();

        WRITING.with(|writing| writing.set(true));
        self.sink.write(&wide);
        WRITING.with(|writing| writing.set(false));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture {
        ready: Arc<AtomicBool>,
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl ConsoleSink for Capture {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        fn write(&self, text: &[u16]) {
            self.lines.lock().push(String::from_utf16_lossy(text));
        }
    }

    #[test]
    fn drops_events_until_ready() {
        let capture = Capture::default();
        let subscriber =
            tracing_subscriber::registry().with(ConsoleLayer::new(capture.clone(), Level::WARN));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("too early");
            capture.ready.store(true, Ordering::SeqCst);
            tracing::error!("on time");
        });

        let lines = capture.lines.lock();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "[ERROR] on time\n");
    }

    #[test]
    fn respects_threshold() {
        let capture = Capture::default();
        capture.ready.store(true, Ordering::SeqCst);
        let subscriber =
            tracing_subscriber::registry().with(ConsoleLayer::new(capture.clone(), Level::WARN));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("quiet");
            tracing::warn!(index = 3, "loud");
        });

        let lines = capture.lines.lock();
        assert_eq!(lines.as_slice(), ["[WARN] loud index=3\n"]);
    }
}
