use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the crates that make up the RAG backend.
pub const TARGET_PREFIXES: &[&str] = &[
    "ai_llm_service",
    "rag_embed",
    "rag_store",
    "contextor",
    "api",
    "course_rag_backend",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_ours(target: &str) -> bool {
    TARGET_PREFIXES.iter().any(|p| {
        target == *p
            || target
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Formatting layer that renders only events emitted by the backend crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line`
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_ours = filter::filter_fn(|meta| is_ours(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_ours)
}

/// Level directives (`crate=level`) for every backend crate.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let level = LevelFilter::from_level(level);
    TARGET_PREFIXES
        .iter()
        .filter_map(|p| format!("{p}={level}").parse::<Directive>().ok())
        .collect()
}

/// `EnvFilter` from `RUST_LOG` (or `default`), with `level` applied to the
/// backend crates.
///
/// With `default = "warn"` and `Level::DEBUG`, dependencies log at WARN and
/// the backend at DEBUG.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    level_directives(level)
        .into_iter()
        .fold(base, |f, d| f.add_directive(d))
}
