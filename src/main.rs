use recordgrid::ui::app::{self, App};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    tracing::info!(store = %app::store_path().display(), "starting statements grid");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::WindowBuilder::new()
                    .with_title("Statements")
                    .with_inner_size(dioxus::desktop::LogicalSize::new(1280.0, 820.0)),
            ),
        )
        .launch(App);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
