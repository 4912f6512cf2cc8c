// Set Windows subsystem to "windows" to prevent console window from appearing
#![cfg_attr(windows, windows_subsystem = "windows")]

mod app;
mod dialog;

use app::ConfiguratorApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "ONVIF Server Emulator Configurator";

fn setup_fonts(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (egui::TextStyle::Heading, egui::FontId::new(18.0, egui::FontFamily::Proportional)),
        (egui::TextStyle::Body, egui::FontId::new(14.0, egui::FontFamily::Proportional)),
        (egui::TextStyle::Monospace, egui::FontId::new(13.0, egui::FontFamily::Monospace)),
        (egui::TextStyle::Button, egui::FontId::new(14.0, egui::FontFamily::Proportional)),
        (egui::TextStyle::Small, egui::FontId::new(12.0, egui::FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<(), eframe::Error> {
    // Initialize logging
    #[cfg(windows)]
    {
        use std::fs::OpenOptions;

        if let Ok(log_file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open("onvif-configurator.log")
        {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file))
                .init();
        } else {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        }
    }

    #[cfg(not(windows))]
    {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    }

    // Blocks on the directory prompt when nothing is configured yet
    let app = ConfiguratorApp::new();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 400.0])
            .with_min_inner_size([400.0, 300.0])
            .with_title(app.window_title()),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            setup_fonts(&cc.egui_ctx);
            Box::new(app)
        }),
    )
}
