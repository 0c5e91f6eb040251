use {
    anyhow::Result,
    std::{
        fs::File,
        path::Path,
        sync::Arc,
    },
    tracing::Level,
    tracing_subscriber::{
        fmt::{
            layer,
            writer::MakeWriterExt,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
    },
};

/// Route tracing output to stdout and, optionally, a log file.
///
/// The evaluator itself only ever warns (e.g. on a degenerate centerline
/// segment), so the file layer captures warnings and above while the stdout
/// layer level is up to the caller.
pub fn init_logging(
    log_file: Option<&Path>,
    min_level_stdout: Option<Level>,
) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = Arc::new(File::create(path)?);
            Some(
                layer()
                    .with_writer(file.with_max_level(Level::WARN))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            layer()
                .with_writer(std::io::stdout.with_max_level(match min_level_stdout {
                    Some(level) => level,
                    None => Level::INFO,
                }))
                .compact()
                .with_target(false),
        )
        .init();

    Ok(())
}
