use crate::{Error, Result};

/// Tracing configuration consumed by the statement interception layer.
///
/// The configuration is fixed at statement construction: a statement created while tracing was enabled keeps logging
/// slow executions even if the connection is later reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TracingOptions {
    /// Whether slow executions are logged.
    pub enabled: bool,

    /// Executions strictly longer than this number of milliseconds are logged.
    pub threshold_millis: u64,
}

impl TracingOptions {
    /// Read the tracing options from the query pairs of a connection URI.
    ///
    /// Recognized parameters are `trace_statements` (boolean) and `slow_statement_threshold`
    /// (milliseconds). Unrecognized parameters are left for the driver to interpret.
    ///
    /// # Example
    /// ```rust
    /// # use poolproxy::options::TracingOptions;
    /// let uri = url::Url::parse("mock://?trace_statements=true&slow_statement_threshold=100").unwrap();
    /// let options = TracingOptions::from_uri(&uri).unwrap();
    /// assert!(options.enabled);
    /// assert_eq!(options.threshold_millis, 100);
    /// ```
    pub fn from_uri(uri: &url::Url) -> Result<Self> {
        let mut options = TracingOptions::default();
        uri.query_pairs().try_for_each(|(key, value)| {
            if key == "trace_statements" {
                if let Ok(value) = value.parse::<bool>() {
                    options.enabled = value;
                } else {
                    return Err(Error::InvalidUri {
                        uri: uri.to_string(),
                        reason: "invalid value for 'trace_statements'".to_string(),
                    });
                }
            } else if key == "slow_statement_threshold" {
                if let Ok(value) = value.parse::<u64>() {
                    options.threshold_millis = value;
                } else {
                    return Err(Error::InvalidUri {
                        uri: uri.to_string(),
                        reason: "invalid value for 'slow_statement_threshold'".to_string(),
                    });
                }
            }
            Ok(())
        })?;
        Ok(options)
    }
}
