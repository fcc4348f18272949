//! Log setup. The terminal is taken over while the show runs, so anything chatty belongs
//! in a log file. Stderr never gets anything below a warning, whatever `SKYBURST_LOG`
//! asks for, and warnings are only emitted before the screen switch.

use std::path::Path;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    EnvFilter, Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Environment variable holding user supplied log filters, `RUST_LOG` syntax.
pub const LOG_FILTER_ENV: &str = "SKYBURST_LOG";

/// Most verbose level allowed onto stderr while the show owns the terminal.
pub const STDERR_CEILING: LevelFilter = LevelFilter::WARN;

/// Terse console output, never more verbose than `STDERR_CEILING`.
fn console_layer<S, W>(writer: W) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(STDERR_CEILING)
}

pub fn setup_logging(log_file: Option<&Path>) -> crate::Result<()> {
    let default_level = if log_file.is_some() { "info" } else { "warn" };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.parse()?)
        .with_env_var(LOG_FILTER_ENV)
        .from_env_lossy();

    match log_file {
        Some(path) => {
            if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(directory)?;
            }
            let file = std::fs::File::create(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn console_drops_chatty_logs_even_with_a_verbose_filter() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(console_layer(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("Firework launched");
            tracing::info!("Show started");
            tracing::warn!("explosion sound disabled");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("explosion sound disabled"));
        assert!(!output.contains("Firework launched"));
        assert!(!output.contains("Show started"));
    }
}
