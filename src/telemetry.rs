//! Log subscriber setup for embedding hosts.

/// Install a `fmt` subscriber for `tracing` output. Returns `false` if a
/// global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt().with_target(false).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn second_init_is_rejected() {
        super::init();
        assert!(!super::init());
    }
}
