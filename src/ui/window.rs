use gdk4 as gdk;
use gtk4::{gio, glib, glib::clone, prelude::*, subclass::prelude::*};
use libadwaita as adw;
use libadwaita::prelude::*;
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::app::SessionInhibitor;
use super::options::OptionsMenu;
use super::video_area::VideoArea;
use crate::constants::{
    APP_NAME, DEFAULT_HEIGHT, DEFAULT_WIDTH, DROP_INDICATOR_DELAY, DROP_INDICATOR_RESET_DELAY,
    EVENT_DRAIN_BATCH, EVENT_DRAIN_INTERVAL, EVENT_QUEUE_CAPACITY, PAUSE_INDICATOR_FLASH,
    VOLUME_MAX,
};
use crate::core::autohide::{HideBlockers, HideToken};
use crate::core::keys::{Modifiers, MouseButton};
use crate::core::open::{DropIndicator, DroppedFile, OpenMode, initial_folder};
use crate::core::view::fullscreen_decoration_layout;
use crate::core::{InhibitGuard, UserCommand, ViewUpdate, WindowController};
use crate::events::{EventReceiver, event_queue};
use crate::player::types::{Track, TrackKind};
use crate::player::MpvEngine;
use crate::services::SettingsHandle;
use crate::utils::format::{elapsed_width_chars, format_time, fullscreen_icon, volume_icon};

/// Actions that only make sense with a file loaded
const FILE_ACTIONS: [&str; 4] = [
    "add-sub-tracks",
    "add-audio-tracks",
    "open-sub-menu",
    "open-audio-menu",
];

const TRACK_KINDS: [TrackKind; 3] = [TrackKind::Subtitle, TrackKind::Audio, TrackKind::Video];

/// Widgets the controller's updates land on, with the change handlers that
/// have to be blocked while they are written.
pub(crate) struct Widgets {
    header: adw::HeaderBar,
    title: adw::WindowTitle,
    toasts: adw::ToastOverlay,
    overlay: gtk4::Overlay,
    stack: gtk4::Stack,
    video: VideoArea,
    top_revealer: gtk4::Revealer,
    bottom_revealer: gtk4::Revealer,
    header_motion: gtk4::EventControllerMotion,
    controls_motion: gtk4::EventControllerMotion,

    play_pause: gtk4::Button,
    previous: gtk4::Button,
    next: gtk4::Button,
    fullscreen: gtk4::Button,
    shuffle: gtk4::ToggleButton,
    shuffle_handler: glib::SignalHandlerId,
    loop_playlist: gtk4::ToggleButton,
    loop_playlist_handler: glib::SignalHandlerId,
    loop_file: gtk4::ToggleButton,
    loop_file_handler: glib::SignalHandlerId,

    progress: gtk4::Scale,
    elapsed: gtk4::Label,
    total: gtk4::Label,
    chapter_popover: gtk4::Popover,
    chapter_label: gtk4::Label,

    volume_menu: gtk4::MenuButton,
    volume: gtk4::Scale,
    volume_handler: glib::SignalHandlerId,
    mute: gtk4::ToggleButton,
    mute_handler: glib::SignalHandlerId,

    open_menu: gtk4::MenuButton,
    main_menu: gtk4::MenuButton,
    sub_menu: gtk4::MenuButton,
    audio_menu: gtk4::MenuButton,
    video_menu: gtk4::MenuButton,
    options: OptionsMenu,

    spinner: gtk4::Spinner,
    pause_indicator: gtk4::Image,
    drop_indicator: gtk4::Box,
    drop_icon: gtk4::Image,
    drop_label: gtk4::Label,
}

impl Widgets {
    fn menu_buttons(&self) -> [&gtk4::MenuButton; 7] {
        [
            &self.open_menu,
            &self.main_menu,
            &self.sub_menu,
            &self.audio_menu,
            &self.video_menu,
            &self.volume_menu,
            &self.options.button,
        ]
    }

    fn track_menu_button(&self, kind: TrackKind) -> &gtk4::MenuButton {
        match kind {
            TrackKind::Subtitle => &self.sub_menu,
            TrackKind::Audio => &self.audio_menu,
            TrackKind::Video => &self.video_menu,
        }
    }
}

fn set_toggle(button: &gtk4::ToggleButton, handler: &glib::SignalHandlerId, active: bool) {
    if button.is_active() != active {
        button.block_signal(handler);
        button.set_active(active);
        button.unblock_signal(handler);
    }
}

/// Remove a pending one-shot timer. Callbacks clear their own slot before
/// returning, so anything left here has not fired yet.
fn cancel_timer(slot: &RefCell<Option<glib::SourceId>>) {
    if let Some(source) = slot.borrow_mut().take() {
        source.remove();
    }
}

/// Natural scrolling as configured for touchpads, which are the devices
/// that produce smooth scroll events.
fn touchpad_natural_scroll() -> bool {
    const SCHEMA: &str = "org.gnome.desktop.peripherals.touchpad";

    let installed = gio::SettingsSchemaSource::default()
        .and_then(|source| source.lookup(SCHEMA, true))
        .is_some();
    installed && gio::Settings::new(SCHEMA).boolean("natural-scroll")
}

/// `(smooth, natural)` for the scroll event a controller is handling.
fn scroll_details(controller: &gtk4::EventControllerScroll, natural_setting: bool) -> (bool, bool) {
    let smooth = controller
        .current_event()
        .and_then(|event| event.downcast::<gdk::ScrollEvent>().ok())
        .map(|event| event.direction() == gdk::ScrollDirection::Smooth)
        .unwrap_or(false);
    (smooth, smooth && natural_setting)
}

fn track_menu(kind: TrackKind, tracks: &[Track]) -> gio::Menu {
    let action = format!("win.{}", kind.action_name());
    let menu = gio::Menu::new();

    let top = gio::Menu::new();
    match kind {
        TrackKind::Subtitle => top.append(Some("Add Subtitle Track…"), Some("win.add-sub-tracks")),
        TrackKind::Audio => top.append(Some("Add Audio Track…"), Some("win.add-audio-tracks")),
        TrackKind::Video => {}
    }
    let none = gio::MenuItem::new(Some("None"), None);
    none.set_action_and_target_value(Some(&action), Some(&0i32.to_variant()));
    top.append_item(&none);
    menu.append_section(None, &top);

    let list = gio::Menu::new();
    for track in tracks
        .iter()
        .filter(|t| t.kind == kind && !(kind == TrackKind::Video && t.album_art))
    {
        let item = gio::MenuItem::new(Some(&track.label()), None);
        item.set_action_and_target_value(Some(&action), Some(&(track.id as i32).to_variant()));
        list.append_item(&item);
    }
    menu.append_section(None, &list);

    menu
}

fn menu_button(icon: &str, tooltip: &str) -> gtk4::MenuButton {
    gtk4::MenuButton::builder()
        .icon_name(icon)
        .tooltip_text(tooltip)
        .css_classes(vec!["flat"])
        .build()
}

fn flat_button(icon: &str, tooltip: &str) -> gtk4::Button {
    gtk4::Button::builder()
        .icon_name(icon)
        .tooltip_text(tooltip)
        .css_classes(vec!["flat"])
        .build()
}

fn flat_toggle(icon: &str, tooltip: &str) -> gtk4::ToggleButton {
    gtk4::ToggleButton::builder()
        .icon_name(icon)
        .tooltip_text(tooltip)
        .css_classes(vec!["flat"])
        .visible(false)
        .build()
}

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct PlayerWindow {
        pub controller: RefCell<Option<WindowController>>,
        pub engine: RefCell<Option<Arc<MpvEngine>>>,
        pub receiver: RefCell<Option<EventReceiver>>,
        pub widgets: OnceCell<Widgets>,
        pub inhibit: RefCell<InhibitGuard>,
        pub drain_timer: RefCell<Option<glib::SourceId>>,
        pub hide_timer: RefCell<Option<glib::SourceId>>,
        pub flash_timer: RefCell<Option<glib::SourceId>>,
        pub drop_timer: RefCell<Option<glib::SourceId>>,
        pub dialogs_open: Cell<u32>,
        pub natural_scroll: Cell<bool>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PlayerWindow {
        const NAME: &'static str = "CinePlayerWindow";
        type Type = super::PlayerWindow;
        type ParentType = adw::ApplicationWindow;
    }

    impl ObjectImpl for PlayerWindow {}
    impl WidgetImpl for PlayerWindow {}

    impl WindowImpl for PlayerWindow {
        fn close_request(&self) -> glib::Propagation {
            self.obj().teardown();
            self.parent_close_request()
        }
    }

    impl ApplicationWindowImpl for PlayerWindow {}
    impl AdwApplicationWindowImpl for PlayerWindow {}
}

glib::wrapper! {
    pub struct PlayerWindow(ObjectSubclass<imp::PlayerWindow>)
        @extends gtk4::Widget, gtk4::Window, gtk4::ApplicationWindow, adw::ApplicationWindow,
        @implements gio::ActionGroup, gio::ActionMap, gtk4::Accessible, gtk4::Buildable,
                    gtk4::ConstraintTarget, gtk4::Native, gtk4::Root, gtk4::ShortcutManager;
}

impl std::fmt::Debug for PlayerWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerWindow")
            .field("controller", &self.imp().controller.borrow())
            .finish()
    }
}

impl PlayerWindow {
    /// Create a window with its own engine. Fails when the engine cannot be
    /// started; nothing is shown in that case.
    pub fn new(app: &adw::Application, settings: SettingsHandle) -> crate::Result<Self> {
        let (sender, receiver) = event_queue(EVENT_QUEUE_CAPACITY);
        let engine = Arc::new(MpvEngine::new(sender)?);
        let controller = WindowController::new(engine.clone(), settings);
        let interface = controller.interface().clone();

        let window: Self = glib::Object::builder()
            .property("application", app)
            .property("title", APP_NAME)
            .property("default-width", DEFAULT_WIDTH)
            .property("default-height", DEFAULT_HEIGHT)
            .build();

        let imp = window.imp();
        imp.controller.replace(Some(controller));
        imp.engine.replace(Some(engine.clone()));
        imp.receiver.replace(Some(receiver));
        imp.natural_scroll.set(touchpad_natural_scroll());

        window.build_ui(engine);
        window.setup_actions();
        window.setup_input();
        window.setup_drop_target();

        let mut updates = vec![ViewUpdate::InterfaceChanged(interface)];
        updates.extend(window.with_controller(|ctl| ctl.start()).unwrap_or_default());
        window.apply(updates);
        window.start_event_drain();

        info!("Player window ready");
        Ok(window)
    }

    /// Replace the playlist with `paths` and start playing.
    pub fn open_paths(&self, paths: Vec<String>) {
        self.perform(UserCommand::Open {
            mode: OpenMode::ClearAndAdd,
            paths,
        });
    }

    fn widgets(&self) -> Option<&Widgets> {
        self.imp().widgets.get()
    }

    fn with_controller<T>(&self, f: impl FnOnce(&mut WindowController) -> T) -> Option<T> {
        self.imp().controller.borrow_mut().as_mut().map(f)
    }

    fn perform(&self, command: UserCommand) {
        if let Some(updates) = self.with_controller(|ctl| ctl.perform(command)) {
            self.apply(updates);
        }
    }

    fn command_sender(&self) -> Rc<dyn Fn(UserCommand)> {
        let weak = self.downgrade();
        Rc::new(move |command| {
            if let Some(window) = weak.upgrade() {
                window.perform(command);
            }
        })
    }

    fn build_ui(&self, engine: Arc<MpvEngine>) {
        // Header bar
        let title = adw::WindowTitle::new(APP_NAME, "");
        let header = adw::HeaderBar::builder()
            .title_widget(&title)
            .css_classes(vec!["osd"])
            .build();

        let open_model = gio::Menu::new();
        open_model.append(Some("Open Files…"), Some("win.clear-and-add"));
        open_model.append(Some("Open Folder…"), Some("win.open-folder"));
        open_model.append(Some("Add to Playlist…"), Some("win.add-playlist-files"));
        let open_menu = menu_button("list-add-symbolic", "Open");
        open_menu.set_menu_model(Some(&open_model));
        header.pack_start(&open_menu);

        let main_model = gio::Menu::new();
        main_model.append(Some("Preferences"), Some("app.preferences"));
        main_model.append(Some("Close Window"), Some("win.quit"));
        let main_menu = menu_button("open-menu-symbolic", "Main Menu");
        main_menu.set_menu_model(Some(&main_model));
        header.pack_end(&main_menu);

        let options = OptionsMenu::new(self.command_sender());
        header.pack_end(&options.button);

        let header_motion = gtk4::EventControllerMotion::new();
        header.add_controller(header_motion.clone());

        // Video surface and start page
        let video = VideoArea::new(engine);
        let start_page = adw::StatusPage::builder()
            .icon_name("applications-multimedia-symbolic")
            .title(APP_NAME)
            .description("Drag and drop videos here")
            .build();
        let start_buttons = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(12)
            .halign(gtk4::Align::Center)
            .build();
        start_buttons.append(
            &gtk4::Button::builder()
                .label("Open Files…")
                .action_name("win.clear-and-add")
                .css_classes(vec!["pill", "suggested-action"])
                .build(),
        );
        start_buttons.append(
            &gtk4::Button::builder()
                .label("Open Folder…")
                .action_name("win.open-folder")
                .css_classes(vec!["pill"])
                .build(),
        );
        start_page.set_child(Some(&start_buttons));

        let stack = gtk4::Stack::builder()
            .transition_type(gtk4::StackTransitionType::Crossfade)
            .build();
        stack.add_named(&start_page, Some("start"));
        video.widget().add_css_class("video-surface");
        stack.add_named(video.widget(), Some("video"));
        stack.set_visible_child_name("start");

        // Transport controls
        let play_pause = flat_button("media-playback-start-symbolic", "Play/Pause");
        play_pause.set_sensitive(false);
        let previous = flat_button("media-skip-backward-symbolic", "Previous");
        previous.set_sensitive(false);
        let next = flat_button("media-skip-forward-symbolic", "Next");
        next.set_sensitive(false);

        let shuffle = flat_toggle("media-playlist-shuffle-symbolic", "Shuffle");
        let loop_playlist = flat_toggle("media-playlist-repeat-symbolic", "Loop Playlist");
        let loop_file = gtk4::ToggleButton::builder()
            .icon_name("media-playlist-repeat-song-symbolic")
            .tooltip_text("Loop File")
            .css_classes(vec!["flat"])
            .build();

        let fullscreen = flat_button(fullscreen_icon(false), "Fullscreen");
        fullscreen.set_action_name(Some("win.toggle-fullscreen"));

        let sub_menu = menu_button("media-view-subtitles-symbolic", "Subtitles");
        let audio_menu = menu_button("audio-x-generic-symbolic", "Audio");
        let video_menu = menu_button("video-x-generic-symbolic", "Video");
        video_menu.set_visible(false);
        for kind in TRACK_KINDS {
            let button = match kind {
                TrackKind::Subtitle => &sub_menu,
                TrackKind::Audio => &audio_menu,
                TrackKind::Video => &video_menu,
            };
            button.set_menu_model(Some(&track_menu(kind, &[])));
        }

        // Volume popover
        let volume = gtk4::Scale::builder()
            .orientation(gtk4::Orientation::Vertical)
            .inverted(true)
            .height_request(150)
            .adjustment(&gtk4::Adjustment::new(100.0, 0.0, VOLUME_MAX, 1.0, 10.0, 0.0))
            .build();
        volume.add_mark(100.0, gtk4::PositionType::Left, None);
        let mute = gtk4::ToggleButton::builder()
            .icon_name("audio-volume-muted-symbolic")
            .tooltip_text("Mute")
            .css_classes(vec!["flat"])
            .build();
        let volume_box = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(6)
            .build();
        volume_box.append(&volume);
        volume_box.append(&mute);
        let volume_menu = menu_button(volume_icon(100.0, false), "Volume");
        volume_menu.set_popover(Some(&gtk4::Popover::builder().child(&volume_box).build()));

        // Progress row
        let elapsed = gtk4::Label::builder()
            .label(format_time(0.0))
            .width_chars(elapsed_width_chars(0.0))
            .css_classes(vec!["numeric"])
            .build();
        let total = gtk4::Label::builder()
            .label(format_time(0.0))
            .css_classes(vec!["numeric"])
            .build();
        let progress = gtk4::Scale::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .hexpand(true)
            .sensitive(false)
            .adjustment(&gtk4::Adjustment::new(0.0, 0.0, 0.0, 1.0, 10.0, 0.0))
            .build();
        let chapter_label = gtk4::Label::new(None);
        let chapter_popover = gtk4::Popover::builder()
            .child(&chapter_label)
            .position(gtk4::PositionType::Top)
            .autohide(false)
            .has_arrow(false)
            .build();

        let progress_box = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(6)
            .build();
        progress_box.append(&elapsed);
        progress_box.append(&progress);
        progress_box.append(&total);
        chapter_popover.set_parent(&progress_box);
        progress_box.connect_destroy(clone!(
            #[weak]
            chapter_popover,
            move |_| chapter_popover.unparent()
        ));

        let left = gtk4::Box::builder().spacing(2).hexpand(true).build();
        left.append(&previous);
        left.append(&play_pause);
        left.append(&next);
        left.append(&shuffle);
        left.append(&loop_playlist);
        left.append(&loop_file);

        let right = gtk4::Box::builder().spacing(2).build();
        right.append(&sub_menu);
        right.append(&audio_menu);
        right.append(&video_menu);
        right.append(&volume_menu);
        right.append(&fullscreen);

        let buttons = gtk4::Box::builder().spacing(6).build();
        buttons.append(&left);
        buttons.append(&right);

        let controls = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(4)
            .margin_start(12)
            .margin_end(12)
            .margin_top(6)
            .margin_bottom(6)
            .css_classes(vec!["toolbar", "osd", "player-chrome"])
            .build();
        controls.append(&progress_box);
        controls.append(&buttons);

        let controls_motion = gtk4::EventControllerMotion::new();
        controls.add_controller(controls_motion.clone());

        let top_revealer = gtk4::Revealer::builder()
            .child(&header)
            .reveal_child(true)
            .valign(gtk4::Align::Start)
            .transition_type(gtk4::RevealerTransitionType::Crossfade)
            .build();
        let bottom_revealer = gtk4::Revealer::builder()
            .child(&controls)
            .reveal_child(true)
            .valign(gtk4::Align::End)
            .transition_type(gtk4::RevealerTransitionType::Crossfade)
            .build();

        // Transient indicators
        let spinner = gtk4::Spinner::builder()
            .halign(gtk4::Align::Center)
            .valign(gtk4::Align::Center)
            .width_request(48)
            .height_request(48)
            .visible(false)
            .build();
        let pause_indicator = gtk4::Image::builder()
            .halign(gtk4::Align::Center)
            .valign(gtk4::Align::Center)
            .pixel_size(64)
            .css_classes(vec!["osd", "pause-indicator"])
            .visible(false)
            .build();

        let drop_icon = gtk4::Image::builder()
            .icon_name(DropIndicator::ADD_TO_PLAYLIST.icon)
            .pixel_size(64)
            .build();
        let drop_label = gtk4::Label::builder()
            .label(DropIndicator::ADD_TO_PLAYLIST.label)
            .css_classes(vec!["title-2"])
            .build();
        let drop_indicator = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(12)
            .halign(gtk4::Align::Center)
            .valign(gtk4::Align::Center)
            .css_classes(vec!["osd", "card", "drop-indicator"])
            .visible(false)
            .build();
        drop_indicator.append(&drop_icon);
        drop_indicator.append(&drop_label);

        let overlay = gtk4::Overlay::builder().child(&stack).build();
        overlay.add_overlay(&top_revealer);
        overlay.add_overlay(&bottom_revealer);
        overlay.add_overlay(&spinner);
        overlay.add_overlay(&pause_indicator);
        overlay.add_overlay(&drop_indicator);

        let toasts = adw::ToastOverlay::builder().child(&overlay).build();
        self.set_content(Some(&toasts));

        // Widget signals
        play_pause.connect_clicked(clone!(
            #[weak(rename_to = window)]
            self,
            move |_| window.perform(UserCommand::TogglePause)
        ));
        previous.connect_clicked(clone!(
            #[weak(rename_to = window)]
            self,
            move |_| window.perform(UserCommand::Previous)
        ));
        next.connect_clicked(clone!(
            #[weak(rename_to = window)]
            self,
            move |_| window.perform(UserCommand::Next)
        ));
        let shuffle_handler = shuffle.connect_toggled(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| window.perform(UserCommand::SetShuffle(button.is_active()))
        ));
        let loop_playlist_handler = loop_playlist.connect_toggled(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| window.perform(UserCommand::SetLoopPlaylist(button.is_active()))
        ));
        let loop_file_handler = loop_file.connect_toggled(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| window.perform(UserCommand::SetLoopFile(button.is_active()))
        ));
        let volume_handler = volume.connect_value_changed(clone!(
            #[weak(rename_to = window)]
            self,
            move |scale| window.perform(UserCommand::SetVolume(scale.value()))
        ));
        let mute_handler = mute.connect_toggled(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| window.perform(UserCommand::SetMute(button.is_active()))
        ));
        // change-value only fires for user interaction
        progress.connect_change_value(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |_, _, value| {
                window.perform(UserCommand::SeekTo(value));
                glib::Propagation::Proceed
            }
        ));

        // Chapter hover
        let progress_motion = gtk4::EventControllerMotion::new();
        progress_motion.connect_motion(clone!(
            #[weak(rename_to = window)]
            self,
            #[weak]
            progress,
            #[weak]
            progress_box,
            #[weak]
            chapter_popover,
            #[weak]
            chapter_label,
            move |_, x, _| {
                let width = progress.width() as f64;
                let Some(hover) = window.with_controller(|ctl| ctl.chapter_hover(x, width)).flatten()
                else {
                    chapter_popover.popdown();
                    return;
                };
                let markup = match &hover.title {
                    Some(title) => {
                        format!("<b>{}</b>\n{}", glib::markup_escape_text(title), hover.time)
                    }
                    None => hover.time.clone(),
                };
                chapter_label.set_markup(&markup);

                // Scale coordinates to the box the popover hangs from
                let x = progress
                    .compute_point(&progress_box, &gtk4::graphene::Point::new(x as f32, 0.0))
                    .map(|p| p.x() as i32)
                    .unwrap_or(x as i32);
                let x = x.clamp(2, (progress_box.width() - 2).max(2));
                chapter_popover.set_pointing_to(Some(&gdk::Rectangle::new(x, 2, 1, 1)));
                chapter_popover.popup();
            }
        ));
        progress_motion.connect_leave(clone!(
            #[weak]
            chapter_popover,
            move |_| chapter_popover.popdown()
        ));
        progress.add_controller(progress_motion);

        // Scrolling over the progress bar and volume button
        let progress_scroll =
            gtk4::EventControllerScroll::new(gtk4::EventControllerScrollFlags::VERTICAL);
        progress_scroll.connect_scroll(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |controller, _dx, dy| {
                let (smooth, natural) =
                    scroll_details(controller, window.imp().natural_scroll.get());
                window.perform(UserCommand::SeekScroll {
                    dy,
                    smooth,
                    natural,
                    at: Instant::now(),
                });
                glib::Propagation::Stop
            }
        ));
        progress.add_controller(progress_scroll);

        let volume_scroll =
            gtk4::EventControllerScroll::new(gtk4::EventControllerScrollFlags::VERTICAL);
        volume_scroll.connect_scroll(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |controller, _dx, dy| {
                let (smooth, natural) =
                    scroll_details(controller, window.imp().natural_scroll.get());
                window.perform(UserCommand::VolumeScroll { dy, smooth, natural });
                glib::Propagation::Stop
            }
        ));
        volume_menu.add_controller(volume_scroll);

        // Menus closing restart the hide countdown. Track menus get a new
        // popover on every rebuild, so this watches the buttons instead.
        for button in [&open_menu, &main_menu, &sub_menu, &audio_menu, &video_menu, &volume_menu] {
            button.connect_active_notify(clone!(
                #[weak(rename_to = window)]
                self,
                move |button| {
                    if !button.is_active() {
                        window.perform(UserCommand::RearmHide);
                    }
                }
            ));
        }
        options.button.connect_active_notify(clone!(
            #[weak(rename_to = window)]
            self,
            move |button| {
                if !button.is_active() {
                    window.perform(UserCommand::RearmHide);
                    return;
                }
                if let Some(snapshot) = window.with_controller(|ctl| ctl.options_snapshot())
                    && let Some(widgets) = window.widgets()
                {
                    widgets.options.show_snapshot(&snapshot);
                }
            }
        ));

        // Fullscreen entered or left by the window manager
        self.connect_fullscreened_notify(|window| {
            window.perform(UserCommand::FullscreenChanged(window.is_fullscreen()));
        });

        let widgets = Widgets {
            header,
            title,
            toasts,
            overlay,
            stack,
            video,
            top_revealer,
            bottom_revealer,
            header_motion,
            controls_motion,
            play_pause,
            previous,
            next,
            fullscreen,
            shuffle,
            shuffle_handler,
            loop_playlist,
            loop_playlist_handler,
            loop_file,
            loop_file_handler,
            progress,
            elapsed,
            total,
            chapter_popover,
            chapter_label,
            volume_menu,
            volume,
            volume_handler,
            mute,
            mute_handler,
            open_menu,
            main_menu,
            sub_menu,
            audio_menu,
            video_menu,
            options,
            spinner,
            pause_indicator,
            drop_indicator,
            drop_icon,
            drop_label,
        };
        if self.imp().widgets.set(widgets).is_err() {
            warn!("Window widgets built twice");
        }
    }

    fn setup_actions(&self) {
        let simple = |name: &str, f: fn(&PlayerWindow)| {
            let action = gio::SimpleAction::new(name, None);
            action.connect_activate(clone!(
                #[weak(rename_to = window)]
                self,
                move |_, _| f(&window)
            ));
            self.add_action(&action);
        };

        simple("clear-and-add", |w| w.show_open_dialog(OpenMode::ClearAndAdd));
        simple("add-playlist-files", |w| w.show_open_dialog(OpenMode::PlaylistAdd));
        simple("add-sub-tracks", |w| w.show_open_dialog(OpenMode::SubAdd));
        simple("add-audio-tracks", |w| w.show_open_dialog(OpenMode::AudioAdd));
        simple("open-folder", |w| w.show_folder_dialog());
        simple("open-sub-menu", |w| {
            if let Some(widgets) = w.widgets() {
                widgets.sub_menu.popup();
            }
        });
        simple("open-audio-menu", |w| {
            if let Some(widgets) = w.widgets() {
                widgets.audio_menu.popup();
            }
        });
        simple("toggle-fullscreen", |w| w.perform(UserCommand::ToggleFullscreen));
        simple("quit", |w| w.close());

        for kind in TRACK_KINDS {
            let action = gio::SimpleAction::new_stateful(
                kind.action_name(),
                Some(glib::VariantTy::INT32),
                &0i32.to_variant(),
            );
            action.connect_activate(clone!(
                #[weak(rename_to = window)]
                self,
                move |action, parameter| {
                    let Some(id) = parameter.and_then(|p| p.get::<i32>()) else {
                        return;
                    };
                    action.set_state(&id.to_variant());
                    window.perform(UserCommand::SelectTrack {
                        kind,
                        id: id as i64,
                    });
                }
            ));
            self.add_action(&action);
        }

        self.set_file_actions_enabled(false);
    }

    fn set_file_actions_enabled(&self, enabled: bool) {
        for name in FILE_ACTIONS {
            if let Some(action) = self.lookup_action(name).and_downcast::<gio::SimpleAction>() {
                action.set_enabled(enabled);
            }
        }
    }

    fn setup_input(&self) {
        let Some(widgets) = self.widgets() else {
            return;
        };

        // Keys go to the engine unless GTK has an accelerator for them
        let keys = gtk4::EventControllerKey::new();
        keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
        keys.connect_key_pressed(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |_, keyval, _keycode, state| {
                let mods = state & gtk4::accelerator_get_default_mod_mask();
                if let Some(app) = window.application() {
                    let accel = gtk4::accelerator_name(keyval, mods);
                    if !app.actions_for_accel(&accel).is_empty() {
                        return glib::Propagation::Proceed;
                    }
                }
                let Some(name) = keyval.name() else {
                    return glib::Propagation::Proceed;
                };

                let tab = matches!(name.as_str(), "Tab" | "ISO_Left_Tab");
                window.perform(UserCommand::Key {
                    name: name.to_string(),
                    mods: Modifiers {
                        ctrl: mods.contains(gdk::ModifierType::CONTROL_MASK),
                        alt: mods.contains(gdk::ModifierType::ALT_MASK),
                        shift: mods.contains(gdk::ModifierType::SHIFT_MASK),
                    },
                });
                // Tab still moves focus
                if tab {
                    glib::Propagation::Proceed
                } else {
                    glib::Propagation::Stop
                }
            }
        ));
        self.add_controller(keys);

        let click = gtk4::GestureClick::builder().button(0).build();
        click.connect_pressed(clone!(
            #[weak(rename_to = window)]
            self,
            move |gesture, n_press, _, _| {
                let Some(button) = MouseButton::from_button(gesture.current_button()) else {
                    return;
                };
                if button.claims_press(n_press) {
                    gesture.set_state(gtk4::EventSequenceState::Claimed);
                }
                window.perform(UserCommand::MousePress { button, n_press });
            }
        ));
        click.connect_released(clone!(
            #[weak(rename_to = window)]
            self,
            move |gesture, _, _, _| {
                let Some(button) = MouseButton::from_button(gesture.current_button()) else {
                    return;
                };
                gesture.set_state(gtk4::EventSequenceState::Claimed);
                window.perform(UserCommand::MouseRelease(button));
            }
        ));
        widgets.stack.add_controller(click);

        let wheel = gtk4::EventControllerScroll::new(gtk4::EventControllerScrollFlags::BOTH_AXES);
        wheel.connect_scroll(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |controller, dx, dy| {
                let (_, natural) = scroll_details(controller, window.imp().natural_scroll.get());
                window.perform(UserCommand::Wheel { dx, dy, natural });
                glib::Propagation::Stop
            }
        ));
        widgets.video.widget().add_controller(wheel);

        let motion = gtk4::EventControllerMotion::new();
        motion.connect_motion(clone!(
            #[weak(rename_to = window)]
            self,
            move |_, x, y| window.perform(UserCommand::PointerMoved { x, y })
        ));
        widgets.overlay.add_controller(motion);
    }

    fn setup_drop_target(&self) {
        let target = gtk4::DropTarget::new(gdk::FileList::static_type(), gdk::DragAction::COPY);
        target.set_preload(true);

        target.connect_enter(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            gdk::DragAction::empty(),
            move |target, _, _| {
                // The preloaded value lands shortly after enter
                let source = glib::timeout_add_local_once(
                    DROP_INDICATOR_DELAY,
                    clone!(
                        #[weak]
                        window,
                        #[weak]
                        target,
                        move || {
                            window.imp().drop_timer.replace(None);
                            window.show_drop_indicator(&target);
                        }
                    ),
                );
                cancel_timer(&window.imp().drop_timer);
                window.imp().drop_timer.replace(Some(source));
                gdk::DragAction::COPY
            }
        ));

        target.connect_leave(clone!(
            #[weak(rename_to = window)]
            self,
            move |_| window.hide_drop_indicator()
        ));

        target.connect_drop(clone!(
            #[weak(rename_to = window)]
            self,
            #[upgrade_or]
            false,
            move |_, value, _, _| {
                window.hide_drop_indicator();
                let Ok(list) = value.get::<gdk::FileList>() else {
                    warn!("Drop without a file list");
                    return false;
                };

                let files: Vec<DroppedFile> = list.files().iter().filter_map(dropped_file).collect();
                if files.is_empty() {
                    return false;
                }
                window.perform(UserCommand::Drop(files));
                true
            }
        ));

        self.add_controller(target);
    }

    fn show_drop_indicator(&self, target: &gtk4::DropTarget) {
        let Some(widgets) = self.widgets() else {
            return;
        };

        let first_name = target
            .value()
            .and_then(|value| value.get::<gdk::FileList>().ok())
            .and_then(|list| list.files().first().and_then(|file| file.basename()))
            .map(|name| name.to_string_lossy().into_owned());
        let is_playing = self
            .with_controller(|ctl| ctl.mirror().is_playing())
            .unwrap_or(false);

        let indicator = DropIndicator::for_drag(first_name.as_deref(), is_playing);
        widgets.drop_icon.set_icon_name(Some(indicator.icon));
        widgets.drop_label.set_label(indicator.label);
        widgets.drop_indicator.set_visible(true);
    }

    fn hide_drop_indicator(&self) {
        let Some(widgets) = self.widgets() else {
            return;
        };
        widgets.drop_indicator.set_visible(false);

        let imp = self.imp();
        cancel_timer(&imp.drop_timer);
        let source = glib::timeout_add_local_once(
            DROP_INDICATOR_RESET_DELAY,
            clone!(
                #[weak(rename_to = window)]
                self,
                move || {
                    window.imp().drop_timer.replace(None);
                    if let Some(widgets) = window.widgets() {
                        widgets.drop_icon.set_icon_name(Some(DropIndicator::ADD_TO_PLAYLIST.icon));
                        widgets.drop_label.set_label(DropIndicator::ADD_TO_PLAYLIST.label);
                    }
                }
            ),
        );
        imp.drop_timer.replace(Some(source));
    }

    fn show_open_dialog(&self, mode: OpenMode) {
        let filter_spec = mode.filter();
        let filter = gtk4::FileFilter::new();
        filter.set_name(Some(filter_spec.name));
        for suffix in &filter_spec.suffixes {
            filter.add_suffix(suffix);
        }
        for mime_type in &filter_spec.mime_types {
            filter.add_mime_type(mime_type);
        }
        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&filter);

        let dialog = gtk4::FileDialog::builder()
            .title(mode.title())
            .modal(true)
            .filters(&filters)
            .default_filter(&filter)
            .build();

        let current = self
            .with_controller(|ctl| ctl.mirror().path.clone())
            .flatten();
        if let Some(folder) = initial_folder(current.as_deref()) {
            dialog.set_initial_folder(Some(&gio::File::for_path(folder)));
        }

        self.dialog_opened();
        dialog.open_multiple(
            Some(self),
            gio::Cancellable::NONE,
            clone!(
                #[weak(rename_to = window)]
                self,
                move |result| {
                    window.dialog_closed();
                    match result {
                        Ok(model) => {
                            let paths: Vec<String> = (0..model.n_items())
                                .filter_map(|i| model.item(i).and_downcast::<gio::File>())
                                .map(|file| file_location(&file))
                                .collect();
                            window.perform(UserCommand::Open { mode, paths });
                        }
                        Err(e) => window.dialog_failed(&e),
                    }
                }
            ),
        );
    }

    fn show_folder_dialog(&self) {
        let dialog = gtk4::FileDialog::builder()
            .title("Open Folder")
            .modal(true)
            .build();

        self.dialog_opened();
        dialog.select_folder(
            Some(self),
            gio::Cancellable::NONE,
            clone!(
                #[weak(rename_to = window)]
                self,
                move |result| {
                    window.dialog_closed();
                    match result {
                        Ok(folder) => window.perform(UserCommand::OpenFolder(file_location(&folder))),
                        Err(e) => window.dialog_failed(&e),
                    }
                }
            ),
        );
    }

    fn dialog_failed(&self, e: &glib::Error) {
        if e.matches(gtk4::DialogError::Dismissed) || e.matches(gtk4::DialogError::Cancelled) {
            debug!("File dialog dismissed");
            return;
        }
        self.perform(UserCommand::DialogFailed(e.message().to_string()));
    }

    fn dialog_opened(&self) {
        let imp = self.imp();
        imp.dialogs_open.set(imp.dialogs_open.get() + 1);
    }

    fn dialog_closed(&self) {
        let imp = self.imp();
        imp.dialogs_open.set(imp.dialogs_open.get().saturating_sub(1));
        self.perform(UserCommand::RearmHide);
    }

    fn start_event_drain(&self) {
        let source = glib::timeout_add_local(
            EVENT_DRAIN_INTERVAL,
            clone!(
                #[weak(rename_to = window)]
                self,
                #[upgrade_or]
                glib::ControlFlow::Break,
                move || {
                    window.drain_events();
                    glib::ControlFlow::Continue
                }
            ),
        );
        self.imp().drain_timer.replace(Some(source));
    }

    fn drain_events(&self) {
        let events = match self.imp().receiver.borrow_mut().as_mut() {
            Some(receiver) => receiver.drain(EVENT_DRAIN_BATCH),
            None => return,
        };

        let updates = self.with_controller(|ctl| {
            let mut updates = ctl.handle_events(events);
            updates.extend(ctl.poll_settings());
            updates
        });
        if let Some(updates) = updates {
            self.apply(updates);
        }
    }

    fn on_hide_timeout(&self, token: HideToken) {
        let Some(widgets) = self.widgets() else {
            return;
        };

        let blockers = HideBlockers {
            popover_open: widgets.menu_buttons().iter().any(|b| b.is_active()),
            hovering_chrome: widgets.header_motion.contains_pointer()
                || widgets.controls_motion.contains_pointer(),
            dialogs_open: self.imp().dialogs_open.get() > 0,
            ..HideBlockers::default()
        };

        if let Some(updates) = self.with_controller(|ctl| ctl.hide_timeout(token, blockers)) {
            self.apply(updates);
        }
    }

    fn arm_hide_timer(&self, token: HideToken, delay: Duration) {
        let imp = self.imp();
        cancel_timer(&imp.hide_timer);
        let source = glib::timeout_add_local_once(
            delay,
            clone!(
                #[weak(rename_to = window)]
                self,
                move || {
                    window.imp().hide_timer.replace(None);
                    window.on_hide_timeout(token);
                }
            ),
        );
        imp.hide_timer.replace(Some(source));
    }

    fn flash_pause_indicator(&self, icon: &str) {
        let Some(widgets) = self.widgets() else {
            return;
        };
        widgets.pause_indicator.set_icon_name(Some(icon));
        widgets.pause_indicator.set_visible(true);

        let imp = self.imp();
        cancel_timer(&imp.flash_timer);
        let source = glib::timeout_add_local_once(
            PAUSE_INDICATOR_FLASH,
            clone!(
                #[weak(rename_to = window)]
                self,
                move || {
                    window.imp().flash_timer.replace(None);
                    if let Some(widgets) = window.widgets() {
                        widgets.pause_indicator.set_visible(false);
                    }
                }
            ),
        );
        imp.flash_timer.replace(Some(source));
    }

    fn sync_inhibit(&self, wanted: bool) {
        let Some(app) = self.application() else {
            return;
        };
        let inhibitor = SessionInhibitor {
            app: &app,
            window: self.upcast_ref(),
        };
        self.imp().inhibit.borrow_mut().sync(wanted, &inhibitor);
    }

    /// Write controller updates to the widgets.
    fn apply(&self, updates: Vec<ViewUpdate>) {
        let Some(w) = self.widgets() else {
            return;
        };

        for update in updates {
            match update {
                ViewUpdate::PlayPauseSensitive(sensitive) => w.play_pause.set_sensitive(sensitive),
                ViewUpdate::Navigation(nav) => {
                    w.previous.set_sensitive(nav.can_go_previous);
                    w.next.set_sensitive(nav.can_go_next);
                    w.shuffle.set_visible(nav.toggles_visible);
                    w.loop_playlist.set_visible(nav.toggles_visible);
                }
                ViewUpdate::LoopPlaylistActive(active) => {
                    set_toggle(&w.loop_playlist, &w.loop_playlist_handler, active)
                }
                ViewUpdate::LoopFileActive(active) => {
                    set_toggle(&w.loop_file, &w.loop_file_handler, active)
                }
                ViewUpdate::Fullscreen(fullscreen) => {
                    if self.is_fullscreen() != fullscreen {
                        self.set_fullscreened(fullscreen);
                    }
                    w.fullscreen.set_icon_name(fullscreen_icon(fullscreen));
                    if fullscreen {
                        let layout = gtk4::Settings::default()
                            .and_then(|s| s.gtk_decoration_layout())
                            .unwrap_or_default();
                        w.header
                            .set_decoration_layout(Some(fullscreen_decoration_layout(&layout)));
                    } else {
                        w.header.set_decoration_layout(None);
                    }
                }
                ViewUpdate::Progress(position) => {
                    w.progress.set_value(position);
                    w.elapsed.set_label(&format_time(position));
                }
                ViewUpdate::Duration(duration) => {
                    let duration = duration.max(0.0);
                    w.total.set_label(&format_time(duration));
                    w.progress.set_range(0.0, duration);
                    w.progress.set_sensitive(duration > 0.0);
                    w.elapsed.set_width_chars(elapsed_width_chars(duration));
                }
                ViewUpdate::Volume { volume, muted } => {
                    if (w.volume.value() - volume).abs() > f64::EPSILON {
                        w.volume.block_signal(&w.volume_handler);
                        w.volume.set_value(volume);
                        w.volume.unblock_signal(&w.volume_handler);
                    }
                    w.volume_menu.set_icon_name(volume_icon(volume, muted));
                }
                ViewUpdate::MuteActive(muted) => set_toggle(&w.mute, &w.mute_handler, muted),
                ViewUpdate::TrackSelected { kind, id } => {
                    if let Some(action) = self
                        .lookup_action(kind.action_name())
                        .and_downcast::<gio::SimpleAction>()
                    {
                        action.set_state(&(id as i32).to_variant());
                    }
                }
                ViewUpdate::TrackMenus {
                    tracks,
                    show_video_menu,
                } => {
                    for kind in TRACK_KINDS {
                        w.track_menu_button(kind)
                            .set_menu_model(Some(&track_menu(kind, &tracks)));
                    }
                    w.video_menu.set_visible(show_video_menu);
                }
                ViewUpdate::ChapterMarks(chapters) => {
                    w.progress.clear_marks();
                    for chapter in &chapters {
                        w.progress.add_mark(chapter.time, gtk4::PositionType::Top, None);
                    }
                }
                ViewUpdate::PlayPauseIcons {
                    button,
                    indicator,
                    flash,
                } => {
                    w.play_pause.set_icon_name(button);
                    if flash {
                        self.flash_pause_indicator(indicator);
                    }
                }
                ViewUpdate::Idle(idle) => {
                    w.stack
                        .set_visible_child_name(if idle { "start" } else { "video" });
                    w.bottom_revealer.set_visible(!idle);
                    self.set_file_actions_enabled(!idle);
                }
                ViewUpdate::Title(title) => {
                    w.title.set_title(&title);
                    self.set_title(Some(title.as_str()));
                }
                ViewUpdate::Inhibit(wanted) => self.sync_inhibit(wanted),
                ViewUpdate::Spinner(spinning) => {
                    w.spinner.set_visible(spinning);
                    w.spinner.set_spinning(spinning);
                }
                ViewUpdate::Toast(message) => w.toasts.add_toast(adw::Toast::new(&message)),
                ViewUpdate::ShowChrome => {
                    w.top_revealer.set_reveal_child(true);
                    w.bottom_revealer.set_reveal_child(true);
                    w.overlay.set_cursor_from_name(None);
                }
                ViewUpdate::HideChrome { hide_cursor } => {
                    w.top_revealer.set_reveal_child(false);
                    w.bottom_revealer.set_reveal_child(false);
                    w.chapter_popover.popdown();
                    if hide_cursor {
                        w.overlay.set_cursor_from_name(Some("none"));
                    }
                }
                ViewUpdate::ArmHideTimer { token, delay } => self.arm_hide_timer(token, delay),
                ViewUpdate::WindowSize { width, height } => {
                    debug!("Sizing window to {}x{}", width, height);
                    self.set_default_size(width, height);
                }
                ViewUpdate::AdjustmentValue(adjustment, value) => {
                    w.options.set_adjustment(adjustment, value)
                }
                ViewUpdate::AspectSelected(ratio) => w.options.set_aspect(ratio),
                ViewUpdate::InterfaceChanged(interface) => w.options.apply_interface(&interface),
                ViewUpdate::CloseWindow => self.close(),
            }
        }
    }

    /// Stop everything in the order the engine needs: no more events, no
    /// more frames, then the engine itself.
    fn teardown(&self) {
        let imp = self.imp();
        let Some(mut controller) = imp.controller.borrow_mut().take() else {
            return;
        };
        info!("Closing player window");
        controller.teardown();

        for timer in [
            &imp.drain_timer,
            &imp.hide_timer,
            &imp.flash_timer,
            &imp.drop_timer,
        ] {
            cancel_timer(timer);
        }

        if let Some(app) = self.application() {
            let inhibitor = SessionInhibitor {
                app: &app,
                window: self.upcast_ref(),
            };
            imp.inhibit.borrow_mut().release(&inhibitor);
        }

        if let Some(mut receiver) = imp.receiver.borrow_mut().take() {
            receiver.close();
        }
        if let Some(widgets) = self.widgets() {
            widgets.video.shutdown();
        }
        if let Some(engine) = imp.engine.borrow_mut().take() {
            engine.shutdown();
        }
        drop(controller);
    }
}

fn file_location(file: &gio::File) -> String {
    file.path()
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.uri().to_string())
}

fn dropped_file(file: &gio::File) -> Option<DroppedFile> {
    let info = match file.query_info(
        "standard::name,standard::type,standard::content-type",
        gio::FileQueryInfoFlags::NONE,
        gio::Cancellable::NONE,
    ) {
        Ok(info) => info,
        Err(e) => {
            warn!("Cannot inspect dropped file {}: {}", file.uri(), e);
            return None;
        }
    };

    Some(DroppedFile {
        location: file_location(file),
        name: info.name().to_string_lossy().into_owned(),
        is_dir: info.file_type() == gio::FileType::Directory,
        content_type: info.content_type().map(|t| t.to_string()).unwrap_or_default(),
    })
}

