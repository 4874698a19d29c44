use flexi_logger::{Logger, LoggerHandle};

/// Start stderr logging. `RUST_LOG` wins over the configured level.
///
/// The returned handle must stay alive for the life of the process.
pub fn init(level: &str) -> anyhow::Result<LoggerHandle> {
    let level = normalize_level(level);
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()?;

    log::info!(
        "star release {} starting on {}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("DEBUG"), "debug");
        assert_eq!(normalize_level(" warning "), "warn");
        assert_eq!(normalize_level("loud"), "info");
        assert_eq!(normalize_level(""), "info");
    }
}
