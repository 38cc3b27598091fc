use gtk4::{gdk, glib, glib::clone, pango, prelude::*, subclass::prelude::*};
use libadwaita as adw;
use libadwaita::prelude::*;
use std::cell::RefCell;
use tracing::{debug, error};

use crate::config::{AspectMode, Config};
use crate::core::preferences::{font_face_name, normalize_languages, rgba_to_hex};
use crate::services::{SettingKey, SettingsHandle};

mod imp {
    use super::*;

    #[derive(Debug, Default)]
    pub struct PreferencesWindow {
        pub settings: RefCell<Option<SettingsHandle>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PreferencesWindow {
        const NAME: &'static str = "CinePreferencesWindow";
        type Type = super::PreferencesWindow;
        type ParentType = adw::PreferencesWindow;
    }

    impl ObjectImpl for PreferencesWindow {}
    impl WidgetImpl for PreferencesWindow {}
    impl WindowImpl for PreferencesWindow {}
    impl adw::subclass::window::AdwWindowImpl for PreferencesWindow {}
    impl adw::subclass::preferences_window::PreferencesWindowImpl for PreferencesWindow {}
}

glib::wrapper! {
    pub struct PreferencesWindow(ObjectSubclass<imp::PreferencesWindow>)
        @extends gtk4::Widget, gtk4::Window, adw::Window, adw::PreferencesWindow,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Native, gtk4::Root, gtk4::ShortcutManager;
}

impl PreferencesWindow {
    pub fn new(parent: Option<&gtk4::Window>, settings: SettingsHandle) -> Self {
        let window: Self = glib::Object::builder()
            .property("title", "Preferences")
            .property("default-width", 600)
            .property("default-height", 560)
            .property("search-enabled", false)
            .build();
        window.set_transient_for(parent);
        window.set_modal(parent.is_some());

        let config = settings.snapshot();
        window.imp().settings.replace(Some(settings));
        window.setup_ui(&config);

        window
    }

    /// Persist one setting; every open window picks it up on its next poll.
    fn save(&self, key: SettingKey, updater: impl FnOnce(&mut Config)) {
        let settings = self.imp().settings.borrow();
        let Some(settings) = settings.as_ref() else {
            return;
        };
        debug!("Saving {:?}", key);
        if let Err(e) = settings.update(key, updater) {
            error!("Failed to save {:?}: {}", key, e);
            self.add_toast(adw::Toast::new(&format!("Could not save preferences: {}", e)));
        }
    }

    fn setup_ui(&self, config: &Config) {
        let page = adw::PreferencesPage::builder()
            .title("General")
            .icon_name("applications-system-symbolic")
            .build();

        page.add(&self.subtitles_group(config));
        page.add(&self.audio_group(config));
        page.add(&self.playback_group(config));
        page.add(&self.interface_group(config));

        self.add(&page);
    }

    fn subtitles_group(&self, config: &Config) -> adw::PreferencesGroup {
        let group = adw::PreferencesGroup::builder().title("Subtitles").build();

        // Color
        let color_button = gtk4::ColorDialogButton::builder()
            .dialog(&gtk4::ColorDialog::builder().with_alpha(false).build())
            .valign(gtk4::Align::Center)
            .build();
        match gdk::RGBA::parse(config.subtitles.color.as_str()) {
            Ok(rgba) => color_button.set_rgba(&rgba),
            Err(_) => debug!("Ignoring stored color {}", config.subtitles.color),
        }
        color_button.connect_rgba_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| {
                let rgba = button.rgba();
                let hex = rgba_to_hex(rgba.red(), rgba.green(), rgba.blue());
                window.save(SettingKey::SubtitleColor, |c| c.subtitles.color = hex);
            }
        ));
        let color_row = adw::ActionRow::builder().title("Text Color").build();
        color_row.add_suffix(&color_button);
        group.add(&color_row);

        // Font
        let font_button = gtk4::FontDialogButton::builder()
            .dialog(&gtk4::FontDialog::new())
            .level(gtk4::FontLevel::Face)
            .use_font(true)
            .valign(gtk4::Align::Center)
            .build();
        font_button.set_font_desc(&pango::FontDescription::from_string(&config.subtitles.font));
        font_button.connect_font_desc_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| {
                let Some(desc) = button.font_desc() else {
                    return;
                };
                let family = desc.family().map(|f| f.to_string()).unwrap_or_default();
                let full = desc.to_str().to_string();
                let style = full.strip_prefix(family.as_str()).unwrap_or("").trim().to_string();
                let font = font_face_name(&family, &style);
                window.save(SettingKey::SubtitleFont, |c| c.subtitles.font = font);
            }
        ));
        let font_row = adw::ActionRow::builder().title("Font").build();
        font_row.add_suffix(&font_button);
        group.add(&font_row);

        let scale_row = adw::SpinRow::builder()
            .title("Scale")
            .digits(2)
            .adjustment(&gtk4::Adjustment::new(config.subtitles.scale, 0.1, 10.0, 0.05, 0.5, 0.0))
            .build();
        scale_row.connect_value_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let scale = row.value();
                window.save(SettingKey::SubtitleScale, |c| c.subtitles.scale = scale);
            }
        ));
        group.add(&scale_row);

        let languages_row = adw::EntryRow::builder()
            .title("Preferred Languages")
            .text(config.subtitles.languages.as_str())
            .show_apply_button(true)
            .build();
        languages_row.connect_apply(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let languages = normalize_languages(&row.text());
                window.save(SettingKey::SubtitleLanguages, |c| c.subtitles.languages = languages);
            }
        ));
        group.add(&languages_row);

        group
    }

    fn audio_group(&self, config: &Config) -> adw::PreferencesGroup {
        let group = adw::PreferencesGroup::builder().title("Audio").build();

        let languages_row = adw::EntryRow::builder()
            .title("Preferred Languages")
            .text(config.audio.languages.as_str())
            .show_apply_button(true)
            .build();
        languages_row.connect_apply(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let languages = normalize_languages(&row.text());
                window.save(SettingKey::AudioLanguages, |c| c.audio.languages = languages);
            }
        ));
        group.add(&languages_row);

        let normalize_row = adw::SwitchRow::builder()
            .title("Normalize Volume")
            .subtitle("Even out loudness between files")
            .active(config.audio.normalize_volume)
            .build();
        normalize_row.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let active = row.is_active();
                window.save(SettingKey::NormalizeVolume, |c| c.audio.normalize_volume = active);
            }
        ));
        group.add(&normalize_row);

        group
    }

    fn playback_group(&self, config: &Config) -> adw::PreferencesGroup {
        let group = adw::PreferencesGroup::builder().title("Playback").build();

        let hwdec_row = adw::SwitchRow::builder()
            .title("Hardware Decoding")
            .active(config.playback.hardware_decoding)
            .build();
        hwdec_row.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let active = row.is_active();
                window.save(SettingKey::HardwareDecoding, |c| {
                    c.playback.hardware_decoding = active
                });
            }
        ));
        group.add(&hwdec_row);

        let position_row = adw::SwitchRow::builder()
            .title("Remember Position")
            .subtitle("Resume files where they were left")
            .active(config.playback.save_position)
            .build();
        position_row.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let active = row.is_active();
                window.save(SettingKey::SavePosition, |c| c.playback.save_position = active);
            }
        ));
        group.add(&position_row);

        let windows_row = adw::SwitchRow::builder()
            .title("Open Files in New Windows")
            .active(config.playback.open_new_windows)
            .build();
        windows_row.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let active = row.is_active();
                window.save(SettingKey::OpenNewWindows, |c| c.playback.open_new_windows = active);
            }
        ));
        group.add(&windows_row);

        group
    }

    fn interface_group(&self, config: &Config) -> adw::PreferencesGroup {
        let group = adw::PreferencesGroup::builder().title("Interface").build();

        let options_row = adw::SwitchRow::builder()
            .title("Video Options Menu")
            .active(config.interface.options_popover)
            .build();
        options_row.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let active = row.is_active();
                window.save(SettingKey::Interface, |c| c.interface.options_popover = active);
            }
        ));
        group.add(&options_row);

        let aspect_row = adw::ComboRow::builder()
            .title("Aspect Ratio Control")
            .model(&gtk4::StringList::new(&["Dropdown", "Cycle Button"]))
            .selected(match config.interface.aspect_mode {
                AspectMode::Dropdown => 0,
                AspectMode::Cycle => 1,
            })
            .build();
        aspect_row.connect_selected_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |row| {
                let mode = match row.selected() {
                    1 => AspectMode::Cycle,
                    _ => AspectMode::Dropdown,
                };
                window.save(SettingKey::Interface, |c| c.interface.aspect_mode = mode);
            }
        ));
        group.add(&aspect_row);

        group
    }
}
