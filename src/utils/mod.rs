//! The `utils` module provides a collection of utility functions and common
//! definitions used across `mocksub`.
//!
//! It centralizes the error taxonomy and the logging bootstrap so the engine,
//! the acknowledgement handle and the binary share one vocabulary.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("bogus");
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
        assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(logging::parse_level("loud"), tracing::Level::INFO);
    }
}
