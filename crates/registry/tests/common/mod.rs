//! Shared helpers for the registry integration tests.

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use weft_context::ContextSnapshot;
use weft_registry::ServicesAccessor;
use weft_registry::test_support::{RecordingTelemetry, TestContextKeys, TestSurfaces, accessor};

/// One captured tracing event.
#[derive(Debug, Clone)]
pub struct LogEntry {
	pub level: Level,
	pub message: String,
}

pub type LogBuffer = Arc<Mutex<Vec<LogEntry>>>;

/// Layer that records every event into a shared buffer.
struct CaptureLayer {
	buffer: LogBuffer,
}

impl<S> Layer<S> for CaptureLayer
where
	S: Subscriber,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut message = String::new();
		event.record(&mut MessageVisitor(&mut message));
		if let Ok(mut buffer) = self.buffer.lock() {
			buffer.push(LogEntry {
				level: *event.metadata().level(),
				message,
			});
		}
	}
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
	fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
		if field.name() == "message" {
			*self.0 = format!("{value:?}");
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			*self.0 = value.to_string();
		}
	}
}

/// Captures events on the current thread until the guard drops.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
	let buffer = LogBuffer::default();
	let subscriber = tracing_subscriber::registry().with(CaptureLayer {
		buffer: buffer.clone(),
	});
	let guard = tracing::subscriber::set_default(subscriber);
	(buffer, guard)
}

pub fn count_messages(buffer: &LogBuffer, needle: &str) -> usize {
	buffer
		.lock()
		.unwrap()
		.iter()
		.filter(|entry| entry.message.contains(needle))
		.count()
}

pub struct Harness {
	pub surfaces: Rc<TestSurfaces>,
	pub root: Rc<TestContextKeys>,
	pub telemetry: Rc<RecordingTelemetry>,
}

impl Harness {
	pub fn new() -> Self {
		Self {
			surfaces: TestSurfaces::new(),
			root: TestContextKeys::new(ContextSnapshot::new()),
			telemetry: RecordingTelemetry::new(),
		}
	}

	pub fn accessor(&self) -> ServicesAccessor {
		accessor(self.surfaces.clone(), self.root.clone()).with_telemetry(self.telemetry.clone())
	}
}
