// SPDX-License-Identifier: Apache-2.0

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LogFlags {
    pub(crate) quiet: bool,
    pub(crate) verbose: u8,
    pub(crate) trace: bool,
    pub(crate) json: bool,
}

impl LogFlags {
    /// Flag override; `None` leaves the environment in charge.
    fn directive(self) -> Option<&'static str> {
        if self.trace {
            Some("trace")
        } else if self.verbose > 1 {
            Some("debug")
        } else if self.verbose == 1 {
            Some("info")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

pub(crate) fn build_filter(flags: LogFlags, bijux_level: Option<&str>) -> EnvFilter {
    if let Some(directive) = flags.directive() {
        return EnvFilter::new(directive);
    }
    if let Some(level) = bijux_level.map(str::trim).filter(|l| !l.is_empty()) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the process-wide subscriber. Logs go to stderr so stdout stays
/// machine readable.
pub(crate) fn init_tracing(flags: LogFlags) {
    let bijux_level = std::env::var("BIJUX_LOG_LEVEL").ok();
    let filter = build_filter(flags, bijux_level.as_deref());
    let result = if flags.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_environment() {
        let flags = LogFlags {
            quiet: true,
            ..LogFlags::default()
        };
        assert_eq!(build_filter(flags, Some("trace")).to_string(), "error");
        let flags = LogFlags {
            verbose: 2,
            quiet: true,
            ..LogFlags::default()
        };
        assert_eq!(build_filter(flags, None).to_string(), "debug");
    }

    #[test]
    fn bijux_level_beats_the_default() {
        assert_eq!(
            build_filter(LogFlags::default(), Some("info")).to_string(),
            "info"
        );
    }
}
