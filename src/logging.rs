//! Logger setup for the command-line tool
//!
//! `CRACKTHRESH_DEBUG` takes an `env_logger` filter (`debug`, `trace`,
//! `crack_thresh::filter=trace`, ...). Unset means warnings only.

use env_logger::{Builder, Env};

/// Variable holding the log filter
pub const DEBUG_ENV: &str = "CRACKTHRESH_DEBUG";

const DEFAULT_FILTER: &str = "warn";

fn builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None).format_target(true);
    builder
}

/// Install the stderr logger. Safe to call more than once.
pub fn init() {
    let _ = builder(Env::new().filter_or(DEBUG_ENV, DEFAULT_FILTER)).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_unset_variable_means_warn() {
        let env = Env::new().filter_or("CRACKTHRESH_TEST_UNSET_FILTER", DEFAULT_FILTER);
        assert_eq!(builder(env).build().filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_filter_value_sets_level() {
        // fallback value stands in for a set variable
        let env = Env::new().filter_or("CRACKTHRESH_TEST_UNSET_FILTER", "trace");
        assert_eq!(builder(env).build().filter(), LevelFilter::Trace);

        let env = Env::new().filter_or("CRACKTHRESH_TEST_UNSET_FILTER", "crack_thresh=debug");
        assert_eq!(builder(env).build().filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
    }
}
