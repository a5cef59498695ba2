//! Verbosity-gated progress output.
//!
//! Progress lines are tagged by the phase that emits them (`CFT>`, `REFN>`,
//! `3PHS>`, `SUBG>`, `HEUR>`, `CFIX>`) and printed only when the
//! environment's verbosity reaches the requested level.

/// Prints to stdout if `env.verbose >= level`.
///
/// ```
/// # use setcov::{vprint, Environment};
/// let env = Environment::default();
/// vprint!(env, 1, "CFT> Instance size: {} x {}.", 10, 100);
/// ```
#[macro_export]
macro_rules! vprint {
    ($env:expr, $level:expr, $($arg:tt)*) => {
        if $env.verbose >= $level {
            println!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::Environment;

    #[test]
    fn gating_compiles_for_all_levels() {
        let mut env = Environment::default();
        env.verbose = 0;
        for level in 0..=5u64 {
            vprint!(env, level, "SUBG> level {}", level);
        }
    }
}
