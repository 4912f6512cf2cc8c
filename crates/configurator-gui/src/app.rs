use crate::dialog::NativeDirectoryPrompt;
use configurator_core::{
    read_server_config, scan_server_configs, ConfigError, ConfigFileStatus, ServerConfigFile,
    UserConfigs,
};
use eframe::egui;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NOTIFICATION_SECS: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: Instant,
}

#[derive(Debug, Clone)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

pub struct AppState {
    pub status_text: String,
    pub notifications: Vec<Notification>,
    pub server_configs: Vec<ServerConfigFile>,
    pub catalog_error: Option<String>,
    pub selected_config: Option<usize>,
    pub selected_config_text: Option<String>,
    pub show_about: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            status_text: "Status: not connected".to_string(),
            notifications: Vec::new(),
            server_configs: Vec::new(),
            catalog_error: None,
            selected_config: None,
            selected_config_text: None,
            show_about: false,
        }
    }
}

pub struct ConfiguratorApp {
    user_configs: UserConfigs,
    app_state: AppState,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl ConfiguratorApp {
    /// Restore the user configuration, prompting for the server configs
    /// directory if none is stored yet. Runs before the window opens.
    pub fn new() -> Self {
        let runtime =
            Arc::new(tokio::runtime::Runtime::new().expect("Failed to create async runtime"));

        let mut user_configs = UserConfigs::new();
        if let Err(e) = runtime.block_on(user_configs.load()) {
            tracing::warn!(
                "Ignoring unreadable {}: {}",
                user_configs.path().display(),
                e
            );
        }

        let mut app = Self {
            user_configs,
            app_state: AppState::default(),
            runtime,
        };

        let mut prompt = NativeDirectoryPrompt::starting_at(app.user_configs.server_configs_dir());
        match app
            .runtime
            .block_on(app.user_configs.ensure_server_configs_dir(&mut prompt))
        {
            Ok(true) => tracing::info!("Server configs directory set on first run"),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to save user config: {}", e);
                app.add_notification(format!("Failed to save settings: {e}"), NotificationLevel::Error);
            }
        }

        app.rescan_server_configs();
        app
    }

    pub fn window_title(&self) -> String {
        self.user_configs.server_configs_dir().to_string()
    }

    fn connect_server(&mut self) {
        tracing::info!("connecting");
    }

    fn disconnect_server(&mut self) {
        tracing::info!("disconnect");
    }

    fn browse_server_configs_dir(&mut self, ctx: &egui::Context) {
        let mut prompt = NativeDirectoryPrompt::starting_at(self.user_configs.server_configs_dir());
        if !self.user_configs.browse_directory(&mut prompt) {
            return;
        }

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
        match self.save_user_configs() {
            Ok(()) => self.add_notification(
                format!("Server configs directory: {}", self.user_configs.server_configs_dir()),
                NotificationLevel::Success,
            ),
            Err(e) => self.add_notification(format!("Failed to save settings: {e}"), NotificationLevel::Error),
        }
        self.rescan_server_configs();
    }

    fn save_user_configs(&mut self) -> Result<(), ConfigError> {
        let result = self.runtime.block_on(self.user_configs.save());
        if let Err(e) = &result {
            tracing::error!("Failed to save user config: {}", e);
        }
        result
    }

    fn rescan_server_configs(&mut self) {
        self.app_state.selected_config = None;
        self.app_state.selected_config_text = None;

        let dir = Path::new(self.user_configs.server_configs_dir());
        match self.runtime.block_on(scan_server_configs(dir)) {
            Ok(files) => {
                tracing::info!("{} server config files in {}", files.len(), dir.display());
                self.app_state.server_configs = files;
                self.app_state.catalog_error = None;
            }
            Err(e) => {
                tracing::warn!("Could not scan {}: {}", dir.display(), e);
                self.app_state.server_configs.clear();
                self.app_state.catalog_error = Some(e.to_string());
            }
        }
    }

    fn select_server_config(&mut self, index: usize) {
        let Some(file) = self.app_state.server_configs.get(index) else {
            return;
        };
        let text = match self.runtime.block_on(read_server_config(&file.path)) {
            Ok(text) => text,
            Err(e) => format!("Cannot display {}: {e}", file.name),
        };
        self.app_state.selected_config = Some(index);
        self.app_state.selected_config_text = Some(text);
    }

    fn add_notification(&mut self, message: String, level: NotificationLevel) {
        self.app_state.notifications.push(Notification {
            message,
            level,
            timestamp: Instant::now(),
        });

        // Keep only last 5 notifications
        if self.app_state.notifications.len() > 5 {
            self.app_state.notifications.remove(0);
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Server", |ui| {
                    if ui.button("Connect").clicked() {
                        self.connect_server();
                        ui.close_menu();
                    }
                    if ui.button("Disconnect").clicked() {
                        self.disconnect_server();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.app_state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.app_state.status_text);
            });
        });
    }

    fn render_directory_row(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        ui.horizontal(|ui| {
            ui.label("Server configs:");
            ui.monospace(self.user_configs.server_configs_dir());
            if ui.button("📁 Browse…").clicked() {
                self.browse_server_configs_dir(&ctx);
            }
        });
    }

    fn render_server_configs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Service configs");
            if ui.button("🔄 Rescan").clicked() {
                self.rescan_server_configs();
                if self.app_state.catalog_error.is_none() {
                    self.add_notification(
                        format!("{} config files found", self.app_state.server_configs.len()),
                        NotificationLevel::Info,
                    );
                }
            }
        });
        ui.separator();

        if let Some(error) = &self.app_state.catalog_error {
            ui.colored_label(egui::Color32::YELLOW, format!("⚠ {error}"));
            return;
        }
        if self.app_state.server_configs.is_empty() {
            ui.label("No .config files in this directory.");
            return;
        }

        let mut clicked = None;
        egui::SidePanel::left("config_list")
            .resizable(true)
            .default_width(220.0)
            .show_inside(ui, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (i, file) in self.app_state.server_configs.iter().enumerate() {
                        let (icon, color) = Self::get_status_icon_and_color(&file.status);
                        ui.horizontal(|ui| {
                            ui.colored_label(color, icon);
                            let selected = self.app_state.selected_config == Some(i);
                            if ui
                                .selectable_label(selected, file.service_name())
                                .on_hover_text(Self::describe_file(file))
                                .clicked()
                            {
                                clicked = Some(i);
                            }
                        });
                    }
                });
            });

        egui::ScrollArea::both().show(ui, |ui| match &self.app_state.selected_config_text {
            Some(text) => {
                ui.monospace(text.as_str());
            }
            None => {
                ui.label("Select a config file to view it.");
            }
        });

        if let Some(i) = clicked {
            self.select_server_config(i);
        }
    }

    fn render_about(&mut self, ctx: &egui::Context) {
        let mut open = self.app_state.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("ONVIF Server Emulator Configurator");
                ui.label(format!("Version: {VERSION}"));
            });
        self.app_state.show_about = open;
    }

    fn render_notifications(&mut self, ctx: &egui::Context) {
        for (i, notification) in self.app_state.notifications.iter().enumerate() {
            let age = notification.timestamp.elapsed().as_secs_f32();
            let alpha = ((1.0 - age / NOTIFICATION_SECS).max(0.0) * 255.0) as u8;
            let color = match notification.level {
                NotificationLevel::Info => egui::Color32::from_rgba_unmultiplied(70, 130, 180, alpha),
                NotificationLevel::Success => egui::Color32::from_rgba_unmultiplied(34, 139, 34, alpha),
                NotificationLevel::Error => egui::Color32::from_rgba_unmultiplied(220, 20, 60, alpha),
            };

            egui::Window::new(format!("notification_{i}"))
                .title_bar(false)
                .resizable(false)
                .anchor(egui::Align2::RIGHT_TOP, [-10.0, 30.0 + (i as f32) * 50.0])
                .frame(egui::Frame::popup(&ctx.style()).fill(color))
                .show(ctx, |ui| {
                    ui.label(&notification.message);
                });
        }

        self.app_state
            .notifications
            .retain(|n| n.timestamp.elapsed().as_secs_f32() < NOTIFICATION_SECS);
        if !self.app_state.notifications.is_empty() {
            ctx.request_repaint();
        }
    }

    fn get_status_icon_and_color(status: &ConfigFileStatus) -> (&str, egui::Color32) {
        match status {
            ConfigFileStatus::Valid => ("✅", egui::Color32::GREEN),
            ConfigFileStatus::Invalid(_) => ("⚠", egui::Color32::YELLOW),
        }
    }

    fn describe_file(file: &ServerConfigFile) -> String {
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let mut text = format!("{}\n{} bytes, modified {}", file.name, file.size_bytes, modified);
        if let ConfigFileStatus::Invalid(reason) = &file.status {
            text.push_str(&format!("\nInvalid JSON: {reason}"));
        }
        text
    }
}

impl Default for ConfiguratorApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for ConfiguratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_menu_bar(ctx);
        self.render_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_directory_row(ui);
            ui.separator();
            self.render_server_configs(ui);
        });

        self.render_about(ctx);
        self.render_notifications(ctx);
    }
}

impl Drop for ConfiguratorApp {
    fn drop(&mut self) {
        // Persist on exit; a failure is already logged by save_user_configs
        if self.user_configs.has_server_configs_dir() && self.save_user_configs().is_err() {
            tracing::warn!("Settings were not saved on exit");
        }
    }
}
