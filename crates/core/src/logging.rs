//! The routed, level-gated log sink forwarded to the host.
//!
//! Every internal diagnostic still goes through ordinary `tracing` macros,
//! exactly as the rest of this crate does — that's the ambient logging
//! stack and is unconditional. This module additionally installs a
//! `tracing_subscriber::Layer` that re-emits each record through the
//! host's core callback bank as `(level, "GoStrike:<tag>", message)`,
//! gated on a single process-wide level below which messages are dropped
//! before formatting.

use std::ffi::CString;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use gostrike_engine::try_callbacks;

/// The four levels the host understands, plus `None` to silence forwarding
/// entirely. Ordered so that `level >= threshold` gates emission.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    None = 4,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Set the process-wide forwarding threshold.
pub fn set_level(level: LogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Read the process-wide forwarding threshold.
pub fn current_level() -> LogLevel {
    match CURRENT_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        2 => LogLevel::Warning,
        3 => LogLevel::Error,
        _ => LogLevel::None,
    }
}

/// Forward one already-formatted line to the host, honoring the current
/// threshold. `tag` becomes the `GoStrike:<tag>` target the host sees.
pub fn forward(level: LogLevel, tag: &str, message: &str) {
    if level < current_level() {
        return;
    }
    let Some(table) = try_callbacks() else {
        return;
    };
    let Some(log_fn) = table.core.log else {
        return;
    };
    let target = format!("GoStrike:{tag}");
    let Ok(target_c) = CString::new(target) else {
        return;
    };
    let Ok(message_c) = CString::new(message) else {
        return;
    };
    log_fn(level as i32, target_c.as_ptr(), message_c.as_ptr());
}

/// A `tracing_subscriber::Layer` that forwards every record accepted by
/// [`current_level`] to the host. Install alongside the usual
/// `fmt` layer during `Init`.
pub struct ForwardingLayer;

impl<S: Subscriber> Layer<S> for ForwardingLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = match *event.metadata().level() {
            tracing::Level::TRACE | tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warning,
            tracing::Level::ERROR => LogLevel::Error,
        };
        if level < current_level() {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        forward(level, event.metadata().target(), &visitor.message);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else if self.message.is_empty() {
            self.message = format!("{}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_gates_forwarding() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::None);
        set_level(LogLevel::Warning);
        assert_eq!(current_level(), LogLevel::Warning);
        set_level(LogLevel::Info);
    }

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("bogus"), None);
    }
}
