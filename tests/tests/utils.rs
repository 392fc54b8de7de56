use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("raincheck=debug,mock_harness=debug"))
            .with_test_writer()
            .init();
    });
}
