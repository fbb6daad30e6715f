use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the beamline simulation.
///
/// The transport loop itself never fails; every variant here is raised either while
/// validating configuration and particle state before the loop starts, or by the
/// export and config-loading glue around it.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A configuration source could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Propagated I/O errors (CSV export, config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("dt must be finite and > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("dt"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let e: Error = io.into();
        assert!(e.to_string().contains("missing.csv"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
