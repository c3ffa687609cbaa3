// SPDX-License-Identifier: MIT OR Apache-2.0
//! Guided tour demo.
//!
//! Opens a window with a small mock game menu. Press `T` to start the tour
//! and `Y` to stop it. An optional first argument names a RON settings file,
//! which is written with the defaults when it does not exist yet.

mod app;
mod scene;

use app::DemoApp;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in [
        "guided_tour_core=debug",
        "guided_tour_egui=debug",
        "guided_tour_demo=debug",
        "wgpu=warn",
        "naga=warn",
    ] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive '{directive}': {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting guided tour demo v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(e) = DemoApp::run(settings_path) {
        tracing::error!("Demo crashed: {e}");
        std::process::exit(1);
    }
}
