use std::sync::Once;

use tracing_subscriber::{filter::FilterFn, layer::SubscriberExt, util::SubscriberInitExt};

/// Route this library's `tracing` output to the platform log. Idempotent.
pub fn setup_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = FilterFn::new(|metadata| {
            metadata
                .module_path()
                .unwrap_or_default()
                .starts_with("spirit")
        });

        #[cfg(target_os = "android")]
        let layer = {
            use tracing_logcat::{LogcatMakeWriter, LogcatTag};
            use tracing_subscriber::fmt::format::Format;

            let writer = match LogcatMakeWriter::new(LogcatTag::Fixed("Spirit-Rust".to_owned())) {
                Ok(writer) => writer,
                Err(error) => {
                    eprintln!("failed to initialize logcat writer: {error}");
                    return;
                }
            };

            tracing_subscriber::fmt::layer()
                .event_format(Format::default().with_level(false).without_time())
                .with_writer(writer)
                .with_ansi(false)
        };

        #[cfg(not(target_os = "android"))]
        let layer = tracing_subscriber::fmt::layer().with_target(true);

        // The host may have installed its own subscriber already
        if let Err(error) = tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
        {
            eprintln!("tracing subscriber not installed: {error}");
        }
    });
}
