use bevy::prelude::*;

use bevy::window::WindowResolution;

use saunter::game::GamePlugin;

use bevy::log::LogPlugin;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};

const LOG_PREFIX: &str = "saunter";
const LOGS_TO_KEEP: usize = 25;

fn setup_file_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Could not create {}: {}, logging to stdout only", log_dir.display(), e);
        init_subscriber(None);
        return None;
    }

    cleanup_old_logs(&log_dir, LOGS_TO_KEEP);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename,
    );
    init_subscriber(Some(file_appender));

    Some(log_path)
}

fn init_subscriber(file_appender: Option<RollingFileAppender>) {
    let file_layer = file_appender.map(|appender| {
        fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
    });

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wgpu=error,bevy_render=info,bevy_ecs=info,saunter=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    // Make room for the file this run is about to create
    let excess = (log_files.len() + 1).saturating_sub(keep_count);
    for file in log_files.iter().take(excess) {
        let _ = fs::remove_file(file.path());
    }
}

fn main() {
    match setup_file_logging() {
        Some(log_file) => println!("Saunter - logging to {}", log_file),
        None => println!("Saunter - logging to stdout"),
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Saunter".into(),
                resolution: WindowResolution::new(960, 540),
                resizable: true,
                ..default()
            }),
            ..default()
        }).build().disable::<LogPlugin>()) // Logging is set up above
        .add_plugins(GamePlugin)
        .run();
}
