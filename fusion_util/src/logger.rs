/// Intercept messages using the `log` crate and print them to STDERR. Defaults to the `info`
/// level; override with `RUST_LOG`.
pub fn setup() {
    use env_logger::{Builder, Env};
    // Tests and repeated calls may race to install the logger; only the first one wins.
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
