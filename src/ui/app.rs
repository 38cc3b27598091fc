use gdk4 as gdk;
use gtk4::{gio, prelude::*};
use libadwaita as adw;
use libadwaita::prelude::*;
use adw::glib;
use tracing::{error, info};

use super::preferences::PreferencesWindow;
use super::window::PlayerWindow;
use crate::constants::APP_ID;
use crate::core::Inhibitor;
use crate::services::SettingsHandle;

const ACCELS: &[(&str, &[&str])] = &[
    ("win.open-folder", &["<primary>i"]),
    ("win.clear-and-add", &["<primary>o"]),
    ("win.add-playlist-files", &["<shift><primary>o"]),
    ("win.open-sub-menu", &["<primary>s"]),
    ("win.open-audio-menu", &["<primary>a"]),
    ("win.quit", &["q", "<primary>w"]),
    ("app.preferences", &["<primary>comma"]),
];

/// Keeps the session awake on behalf of one window.
pub(crate) struct SessionInhibitor<'a> {
    pub app: &'a gtk4::Application,
    pub window: &'a gtk4::Window,
}

impl Inhibitor for SessionInhibitor<'_> {
    fn inhibit(&self, reason: &str) -> u32 {
        self.app.inhibit(
            Some(self.window),
            gtk4::ApplicationInhibitFlags::IDLE,
            Some(reason),
        )
    }

    fn uninhibit(&self, cookie: u32) {
        self.app.uninhibit(cookie);
    }
}

pub struct CineApp {
    app: adw::Application,
}

impl Default for CineApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CineApp {
    pub fn new() -> Self {
        let settings = SettingsHandle::load();

        let app = adw::Application::builder()
            .application_id(APP_ID)
            .flags(gio::ApplicationFlags::HANDLES_OPEN)
            .build();

        let settings_startup = settings.clone();
        app.connect_startup(move |app| {
            info!("Application starting up");

            let css_provider = gtk4::CssProvider::new();
            css_provider.load_from_string(include_str!("style.css"));
            match gdk::Display::default() {
                Some(display) => gtk4::style_context_add_provider_for_display(
                    &display,
                    &css_provider,
                    gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
                ),
                None => error!("No display to attach styles to"),
            }

            for (action, accels) in ACCELS {
                app.set_accels_for_action(action, accels);
            }

            let preferences_action = gio::SimpleAction::new("preferences", None);
            let settings = settings_startup.clone();
            let app_weak = app.downgrade();
            preferences_action.connect_activate(move |_, _| {
                let Some(app) = app_weak.upgrade() else {
                    return;
                };
                let parent = app.active_window();
                PreferencesWindow::new(parent.as_ref(), settings.clone()).present();
            });
            app.add_action(&preferences_action);
        });

        let settings_activate = settings.clone();
        app.connect_activate(move |app| {
            info!("Application activated - creating player window");
            if let Some(window) = new_window(app, &settings_activate) {
                window.present();
            }
        });

        let settings_open = settings;
        app.connect_open(move |app, files, _hint| {
            let paths: Vec<String> = files
                .iter()
                .map(|file| {
                    file.path()
                        .map(|path| path.to_string_lossy().into_owned())
                        .unwrap_or_else(|| file.uri().to_string())
                })
                .collect();
            info!("Opening {} file(s) from the command line", paths.len());

            let reuse = !settings_open.read(|config| config.playback.open_new_windows);
            let window = reuse
                .then(|| app.active_window().and_downcast::<PlayerWindow>())
                .flatten()
                .or_else(|| new_window(app, &settings_open));

            if let Some(window) = window {
                window.open_paths(paths);
                window.present();
            }
        });

        Self { app }
    }

    pub fn run(&self) -> glib::ExitCode {
        info!("Running Cine application");
        self.app.run()
    }
}

fn new_window(app: &adw::Application, settings: &SettingsHandle) -> Option<PlayerWindow> {
    match PlayerWindow::new(app, settings.clone()) {
        Ok(window) => Some(window),
        Err(e) => {
            error!("Could not create a player window: {}", e);
            None
        }
    }
}
