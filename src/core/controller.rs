//! Window controller: the glue between engine notifications, user gestures
//! and widget state.
//!
//! The controller owns the mirror of engine state and every piece of
//! derived UI state. It never touches widgets directly; each entry point
//! returns the [`ViewUpdate`]s the window has to apply.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};

use crate::config::InterfaceConfig;
use crate::constants::{APP_NAME, SEEK_SCROLL_THROTTLE};
use crate::core::adjustments::{flip_available, flip_ops, rotate, AdjustStep, Adjustment, Flip, Rotation};
use crate::core::aspect::{AspectCycle, AspectRatio};
use crate::core::autohide::{AutoHide, HideBlockers, HideOutcome, HideToken};
use crate::core::commands::UserCommand;
use crate::core::inhibit::should_inhibit;
use crate::core::keys::{classify_key, scroll_step, wheel_key, KeyAction};
use crate::core::mirror::PlaybackMirror;
use crate::core::navigation::{next_op, previous_op, shuffle_op, NavState};
use crate::core::open::{drop_ops, open_folder_ops, open_ops, OpenMode};
use crate::core::view::{fit_window_size, ChapterHover, ViewUpdate};
use crate::events::{EngineEvent, EngineLogLevel};
use crate::player::engine_config::{parse_conf_hwdec, setting_change_ops, settings_ops};
use crate::player::tracks::real_video_count;
use crate::player::types::{EndFileReason, EngineOp, PropertyValue, TrackKind};
use crate::player::{PlaybackEngine, PlayerProperty};
use crate::services::{SettingKey, SettingsHandle, SettingsSubscription};
use crate::utils::format::play_pause_icons;
use crate::utils::CineError;

type PropertyHandler = fn(&mut WindowController, &mut Vec<ViewUpdate>);

/// Widget side of every observed property. Handlers run after the mirror
/// has been updated and read their value from it.
static PROPERTY_HANDLERS: [(PlayerProperty, PropertyHandler); 31] = [
    (PlayerProperty::Path, on_path),
    (PlayerProperty::PlaylistCount, on_playlist_change),
    (PlayerProperty::PlaylistPos, on_playlist_change),
    (PlayerProperty::LoopPlaylist, on_loop_playlist),
    (PlayerProperty::LoopFile, on_loop_file),
    (PlayerProperty::Fullscreen, on_fullscreen),
    (PlayerProperty::TimePos, on_time_pos),
    (PlayerProperty::Duration, on_duration),
    (PlayerProperty::Volume, on_volume),
    (PlayerProperty::Mute, on_mute),
    (PlayerProperty::Sid, on_sid),
    (PlayerProperty::Aid, on_aid),
    (PlayerProperty::Vid, on_vid),
    (PlayerProperty::TrackList, on_list_rebuilt),
    (PlayerProperty::ChapterList, on_list_rebuilt),
    (PlayerProperty::Pause, on_pause),
    (PlayerProperty::EofReached, on_eof_reached),
    (PlayerProperty::IdleActive, on_idle),
    (PlayerProperty::MediaTitle, on_media_title),
    (PlayerProperty::VolumeMax, on_option_value),
    (PlayerProperty::VideoRotate, on_option_value),
    (PlayerProperty::AspectOverride, on_option_value),
    (PlayerProperty::HwdecCurrent, on_option_value),
    (PlayerProperty::VideoZoom, on_option_value),
    (PlayerProperty::Contrast, on_option_value),
    (PlayerProperty::Brightness, on_option_value),
    (PlayerProperty::Gamma, on_option_value),
    (PlayerProperty::Saturation, on_option_value),
    (PlayerProperty::SubDelay, on_option_value),
    (PlayerProperty::AudioDelay, on_option_value),
    (PlayerProperty::Speed, on_option_value),
];

fn handler_for(property: PlayerProperty) -> Option<PropertyHandler> {
    PROPERTY_HANDLERS
        .iter()
        .find(|(p, _)| *p == property)
        .map(|(_, handler)| *handler)
}

fn on_path(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    if ctl.mirror.path.is_some() {
        out.push(ViewUpdate::PlayPauseSensitive(true));
    }
}

fn on_playlist_change(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::Navigation(ctl.navigation()));
}

fn on_loop_playlist(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::LoopPlaylistActive(ctl.mirror.loop_playlist));
    out.push(ViewUpdate::Navigation(ctl.navigation()));
}

fn on_loop_file(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::LoopFileActive(ctl.mirror.loop_file));
}

fn on_fullscreen(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::Fullscreen(ctl.mirror.fullscreen));
}

fn on_time_pos(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::Progress(ctl.mirror.time_pos));
}

fn on_duration(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::Duration(ctl.mirror.duration));
}

fn on_volume(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    let volume = ctl.mirror.volume;
    ctl.engine.show_text(&format!("Volume: {}%", volume as i64));
    out.push(ViewUpdate::Volume {
        volume,
        muted: ctl.mirror.muted,
    });
}

fn on_mute(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::MuteActive(ctl.mirror.muted));
    out.push(ViewUpdate::Volume {
        volume: ctl.mirror.volume,
        muted: ctl.mirror.muted,
    });
}

fn on_sid(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::TrackSelected {
        kind: TrackKind::Subtitle,
        id: ctl.mirror.sid,
    });
}

fn on_aid(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::TrackSelected {
        kind: TrackKind::Audio,
        id: ctl.mirror.aid,
    });
}

fn on_vid(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    out.push(ViewUpdate::TrackSelected {
        kind: TrackKind::Video,
        id: ctl.mirror.vid,
    });
}

// The pump follows up with TracksChanged/ChaptersChanged
fn on_list_rebuilt(_ctl: &mut WindowController, _out: &mut Vec<ViewUpdate>) {}

// Only kept in the mirror; gestures and the options popover read it there
fn on_option_value(_ctl: &mut WindowController, _out: &mut Vec<ViewUpdate>) {}

fn on_pause(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    let (button, indicator) = play_pause_icons(ctl.mirror.paused);
    out.push(ViewUpdate::PlayPauseIcons {
        button,
        indicator,
        flash: !ctl.mirror.idle_active,
    });
    out.push(ctl.inhibit_update());
}

/// keep-open leaves the last frame up; rewind so play starts over.
fn on_eof_reached(ctl: &mut WindowController, _out: &mut Vec<ViewUpdate>) {
    if ctl.mirror.eof_reached {
        debug!("End of file reached, rewinding");
        ctl.dispatch(vec![
            EngineOp::command("seek", ["0", "absolute"]),
            EngineOp::set("pause", true),
        ]);
    }
}

fn on_idle(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    let idle = ctl.mirror.idle_active;
    out.push(ViewUpdate::Idle(idle));
    if idle {
        out.push(ViewUpdate::ShowChrome);
        out.push(ViewUpdate::Title(APP_NAME.to_string()));
    }
    out.push(ctl.inhibit_update());
}

fn on_media_title(ctl: &mut WindowController, out: &mut Vec<ViewUpdate>) {
    if let Some(title) = &ctl.mirror.media_title {
        out.push(ViewUpdate::Title(title.clone()));
    }
}

/// Values shown when the options popover opens.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsSnapshot {
    pub adjustments: Vec<(Adjustment, f64)>,
    /// `None` when the override matches no listed ratio
    pub aspect: Option<AspectRatio>,
    pub flip_available: bool,
}

pub struct WindowController {
    engine: Arc<dyn PlaybackEngine>,
    settings: SettingsHandle,
    subscription: Option<SettingsSubscription>,
    interface: InterfaceConfig,
    /// Decoders from the user's engine config, used when re-enabling hwdec
    conf_hwdec: Vec<String>,
    mirror: PlaybackMirror,
    shuffle: bool,
    autohide: AutoHide,
    aspect: AspectCycle,
    last_seek_scroll: Option<Instant>,
    sized_to_video: bool,
    torn_down: bool,
}

impl std::fmt::Debug for WindowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("mirror", &self.mirror)
            .field("shuffle", &self.shuffle)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl WindowController {
    pub fn new(engine: Arc<dyn PlaybackEngine>, settings: SettingsHandle) -> Self {
        let subscription = settings.subscribe();
        let interface = settings.read(|config| config.interface.clone());

        Self {
            engine,
            settings,
            subscription: Some(subscription),
            interface,
            conf_hwdec: Vec::new(),
            mirror: PlaybackMirror::default(),
            shuffle: false,
            autohide: AutoHide::new(),
            aspect: AspectCycle::default(),
            last_seek_scroll: None,
            sized_to_video: false,
            torn_down: false,
        }
    }

    /// Push the persisted settings into the engine and start the first
    /// hide countdown.
    pub fn start(&mut self) -> Vec<ViewUpdate> {
        self.conf_hwdec = self
            .engine
            .get_string("hwdec")
            .map(|value| parse_conf_hwdec(&value))
            .unwrap_or_default();
        debug!("Configured decoders: {:?}", self.conf_hwdec);

        let config = self.settings.snapshot();
        self.dispatch(settings_ops(&config, &self.conf_hwdec));

        vec![self.arm_hide(false)]
    }

    pub fn mirror(&self) -> &PlaybackMirror {
        &self.mirror
    }

    pub fn interface(&self) -> &InterfaceConfig {
        &self.interface
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn navigation(&self) -> NavState {
        NavState::compute(
            self.mirror.playlist_count,
            self.mirror.playlist_pos,
            self.mirror.loop_playlist,
            self.shuffle,
        )
    }

    fn inhibit_update(&self) -> ViewUpdate {
        ViewUpdate::Inhibit(should_inhibit(self.mirror.paused, self.mirror.idle_active))
    }

    /// Send ops to the engine, dropping property writes that would leave
    /// the engine as it already is.
    fn dispatch(&self, ops: Vec<EngineOp>) {
        let ops: Vec<EngineOp> = ops
            .into_iter()
            .filter(|op| match op {
                EngineOp::Set { property, value } if self.mirror.matches(property, value) => {
                    trace!("Skipping {} write, already {:?}", property, value);
                    false
                }
                _ => true,
            })
            .collect();

        if !ops.is_empty() {
            self.engine.execute(&ops);
        }
    }

    fn arm_hide(&mut self, keyboard: bool) -> ViewUpdate {
        ViewUpdate::ArmHideTimer {
            token: self.autohide.arm(),
            delay: AutoHide::delay(keyboard),
        }
    }

    fn reveal_chrome(&mut self, keyboard: bool, out: &mut Vec<ViewUpdate>) {
        out.push(ViewUpdate::ShowChrome);
        out.push(ViewUpdate::ArmHideTimer {
            token: self.autohide.activity(),
            delay: AutoHide::delay(keyboard),
        });
    }

    fn reapply_shuffle(&self) {
        if self.shuffle {
            self.dispatch(vec![shuffle_op(true)]);
        }
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = EngineEvent>) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        for event in events {
            updates.extend(self.handle_event(event));
        }
        updates
    }

    pub fn handle_event(&mut self, event: EngineEvent) -> Vec<ViewUpdate> {
        if self.torn_down {
            debug!("Dropping {} after teardown", event.kind());
            return Vec::new();
        }

        let mut out = Vec::new();

        match event {
            EngineEvent::PropertyChanged { property, value } => {
                self.apply_property(property, &value, &mut out);
            }
            EngineEvent::TracksChanged(tracks) => {
                let show_video_menu = real_video_count(&tracks) > 1;
                self.mirror.tracks = tracks.clone();
                out.push(ViewUpdate::TrackMenus {
                    tracks,
                    show_video_menu,
                });
            }
            EngineEvent::ChaptersChanged(chapters) => {
                self.mirror.chapters = chapters.clone();
                out.push(ViewUpdate::ChapterMarks(chapters));
            }
            EngineEvent::StartFile => out.push(ViewUpdate::Spinner(true)),
            EngineEvent::FileLoaded => out.push(ViewUpdate::Spinner(false)),
            EngineEvent::EndFile(reason) => {
                out.push(ViewUpdate::Spinner(false));
                if let EndFileReason::Error(message) = reason {
                    warn!("Playback failed: {}", message);
                    out.push(ViewUpdate::Toast(format!("File Error: {}", message)));
                    self.dispatch(vec![EngineOp::bare("stop")]);
                }
            }
            EngineEvent::VideoSize { width, height } => {
                if !self.sized_to_video && !self.mirror.fullscreen {
                    if let Some((width, height)) = fit_window_size(width, height) {
                        self.sized_to_video = true;
                        out.push(ViewUpdate::WindowSize { width, height });
                    }
                }
            }
            EngineEvent::Log { level, prefix, text } => {
                let text = text.trim_end();
                match level {
                    EngineLogLevel::Error => error!("[{}] {}", prefix, text),
                    EngineLogLevel::Warn => warn!("[{}] {}", prefix, text),
                    EngineLogLevel::Info => info!("[{}] {}", prefix, text),
                    EngineLogLevel::Debug => debug!("[{}] {}", prefix, text),
                }
            }
            EngineEvent::Shutdown => {
                info!("Engine shut down, closing window");
                out.push(ViewUpdate::CloseWindow);
            }
        }

        out
    }

    fn apply_property(
        &mut self,
        property: PlayerProperty,
        value: &PropertyValue,
        out: &mut Vec<ViewUpdate>,
    ) {
        self.mirror.apply(property, value);

        match handler_for(property) {
            Some(handler) => handler(self, out),
            None => debug!("No handler for {}", property.name()),
        }
    }

    pub fn perform(&mut self, command: UserCommand) -> Vec<ViewUpdate> {
        if self.torn_down {
            debug!("Ignoring {:?} after teardown", command);
            return Vec::new();
        }

        trace!("Performing {:?}", command);
        let mut out = Vec::new();

        match command {
            // The engine flips its own state; the mirror may lag behind it
            UserCommand::TogglePause => self.dispatch(vec![EngineOp::command("cycle", ["pause"])]),
            UserCommand::Previous => {
                self.dispatch(vec![previous_op(self.mirror.playlist_pos, self.mirror.playlist_count)]);
            }
            UserCommand::Next => {
                self.dispatch(vec![next_op(self.mirror.playlist_pos, self.mirror.playlist_count)]);
            }
            UserCommand::SetMute(muted) => self.dispatch(vec![EngineOp::set("mute", muted)]),
            UserCommand::SetVolume(volume) => self.dispatch(vec![EngineOp::set("volume", volume)]),
            UserCommand::SeekTo(time) => self.dispatch(vec![EngineOp::set("time-pos", time)]),
            UserCommand::SeekScroll {
                dy,
                smooth,
                natural,
                at,
            } => {
                if let Some(position) = self.seek_scroll(dy, smooth, natural, at) {
                    out.push(ViewUpdate::Progress(position));
                }
            }
            UserCommand::VolumeScroll { dy, smooth, natural } => {
                self.volume_scroll(dy, smooth, natural);
            }
            UserCommand::SetShuffle(enabled) => {
                self.shuffle = enabled;
                self.dispatch(vec![shuffle_op(enabled)]);
                out.push(ViewUpdate::Navigation(self.navigation()));
            }
            UserCommand::SetLoopPlaylist(enabled) => {
                if enabled {
                    self.dispatch(vec![
                        EngineOp::set("loop-playlist", "inf"),
                        EngineOp::set("loop-file", "no"),
                    ]);
                    out.push(ViewUpdate::LoopFileActive(false));
                } else {
                    self.dispatch(vec![EngineOp::set("loop-playlist", "no")]);
                }
            }
            UserCommand::SetLoopFile(enabled) => {
                if enabled {
                    self.dispatch(vec![
                        EngineOp::set("loop-file", "inf"),
                        EngineOp::set("loop-playlist", "no"),
                    ]);
                    out.push(ViewUpdate::LoopPlaylistActive(false));
                } else {
                    self.dispatch(vec![EngineOp::set("loop-file", "no")]);
                }
            }
            UserCommand::ToggleFullscreen => {
                self.dispatch(vec![EngineOp::set("fullscreen", !self.mirror.fullscreen)]);
            }
            UserCommand::FullscreenChanged(fullscreen) => {
                self.dispatch(vec![EngineOp::set("fullscreen", fullscreen)]);
                out.push(self.arm_hide(false));
            }
            UserCommand::SelectTrack { kind, id } => {
                let mut ops = Vec::with_capacity(2);
                if kind == TrackKind::Subtitle {
                    ops.push(EngineOp::command("set", ["sub-visibility", "yes"]));
                }
                let value = if id > 0 {
                    PropertyValue::Int(id)
                } else {
                    PropertyValue::from("no")
                };
                ops.push(EngineOp::set(kind.selection_property(), value));
                self.dispatch(ops);
                out.push(ViewUpdate::TrackSelected { kind, id });
            }
            UserCommand::Adjust(adjustment, step) => {
                let value = self.adjust(adjustment, step);
                out.push(ViewUpdate::AdjustmentValue(adjustment, value));
            }
            UserCommand::Rotate(rotation) => self.rotate(rotation),
            UserCommand::SetAspect(ratio) => {
                self.aspect.set(ratio);
                self.dispatch(vec![ratio.op()]);
                out.push(ViewUpdate::AspectSelected(ratio));
            }
            UserCommand::CycleAspect => {
                let ratio = self.aspect.advance();
                self.dispatch(vec![
                    ratio.op(),
                    EngineOp::ShowText(format!("Aspect Ratio: {}", ratio.label())),
                ]);
                out.push(ViewUpdate::AspectSelected(ratio));
            }
            UserCommand::Flip(flip) => self.dispatch(flip_ops(flip)),
            UserCommand::ResetAllOptions => out.extend(self.reset_all_options()),
            UserCommand::Open { mode, paths } => {
                if paths.is_empty() {
                    return out;
                }
                info!("Opening {} file(s) ({:?})", paths.len(), mode);
                self.dispatch(open_ops(mode, &paths));
                if matches!(mode, OpenMode::ClearAndAdd | OpenMode::PlaylistAdd) {
                    self.reapply_shuffle();
                }
            }
            UserCommand::OpenFolder(folder) => {
                info!("Opening folder {}", folder);
                self.dispatch(open_folder_ops(&folder));
                self.reapply_shuffle();
            }
            UserCommand::Drop(files) => {
                let was_empty = self.mirror.playlist_count == 0;
                let ops = drop_ops(&files, self.mirror.is_playing(), was_empty);
                debug!("Drop of {} file(s) produced {} op(s)", files.len(), ops.len());
                if !ops.is_empty() {
                    self.dispatch(ops);
                    self.reapply_shuffle();
                }
            }
            UserCommand::Key { name, mods } => match classify_key(&name, mods) {
                KeyAction::LeaveFullscreen => {
                    self.dispatch(vec![EngineOp::set("fullscreen", false)]);
                }
                KeyAction::RevealChrome => self.reveal_chrome(true, &mut out),
                KeyAction::Forward(chord) => {
                    self.dispatch(vec![EngineOp::command("keypress", [chord])]);
                }
            },
            UserCommand::MousePress { button, .. } => {
                self.dispatch(vec![button.press_op()]);
                self.reveal_chrome(false, &mut out);
            }
            UserCommand::MouseRelease(button) => self.dispatch(vec![button.release_op()]),
            UserCommand::Wheel { dx, dy, natural } => {
                if let Some(key) = wheel_key(dx, dy, natural) {
                    self.dispatch(vec![EngineOp::command("keypress", [key])]);
                }
            }
            UserCommand::PointerMoved { x, y } => {
                if let Some(token) = self.autohide.pointer_moved(x, y) {
                    out.push(ViewUpdate::ShowChrome);
                    out.push(ViewUpdate::ArmHideTimer {
                        token,
                        delay: AutoHide::delay(false),
                    });
                }
            }
            UserCommand::RearmHide => out.push(self.arm_hide(false)),
            UserCommand::DialogFailed(message) => {
                error!("{}", CineError::Dialog(message.clone()));
                out.push(ViewUpdate::Toast(format!("File Error: {}", message)));
            }
        }

        out
    }

    /// Seek relative to the current position; repeats within the throttle
    /// window are dropped.
    fn seek_scroll(&mut self, dy: f64, smooth: bool, natural: bool, at: Instant) -> Option<f64> {
        if self.mirror.duration <= 0.0 {
            return None;
        }
        if let Some(last) = self.last_seek_scroll {
            if at.saturating_duration_since(last) < SEEK_SCROLL_THROTTLE {
                return None;
            }
        }
        self.last_seek_scroll = Some(at);

        let step = scroll_step(dy, smooth, natural, self.interface.seek_scroll_step);
        let position = (self.mirror.time_pos - step).clamp(0.0, self.mirror.duration);
        self.dispatch(vec![EngineOp::set("time-pos", position)]);
        Some(position)
    }

    fn volume_scroll(&mut self, dy: f64, smooth: bool, natural: bool) {
        let max = self.mirror.volume_max;
        let step = scroll_step(dy, smooth, natural, self.interface.volume_scroll_step);
        let volume = (self.mirror.volume - step).trunc().clamp(0.0, max);
        self.dispatch(vec![EngineOp::set("volume", volume)]);
    }

    fn adjust(&mut self, adjustment: Adjustment, step: AdjustStep) -> f64 {
        let current = self.mirror.adjustments.get(adjustment);
        let value = adjustment.next_value(current, step);

        self.dispatch(vec![
            EngineOp::set(adjustment.property(), adjustment.to_property_value(value)),
            EngineOp::ShowText(adjustment.osd_text(value)),
        ]);
        value
    }

    fn rotate(&mut self, rotation: Rotation) {
        let degrees = rotate(self.mirror.video_rotate, rotation);
        self.dispatch(vec![EngineOp::command(
            "set",
            ["video-rotate".to_string(), degrees.to_string()],
        )]);
    }

    fn reset_all_options(&mut self) -> Vec<ViewUpdate> {
        let mut out = Vec::with_capacity(Adjustment::ALL.len() + 1);

        self.aspect.reset();
        self.dispatch(vec![AspectRatio::Original.op()]);
        out.push(ViewUpdate::AspectSelected(AspectRatio::Original));

        self.rotate(Rotation::Reset);
        self.dispatch(flip_ops(Flip::Reset));

        for adjustment in Adjustment::ALL {
            let value = adjustment.default_value();
            self.dispatch(vec![EngineOp::set(
                adjustment.property(),
                adjustment.to_property_value(value),
            )]);
            out.push(ViewUpdate::AdjustmentValue(adjustment, value));
        }

        out
    }

    /// Option values for the popover, taken from the mirror.
    pub fn options_snapshot(&mut self) -> OptionsSnapshot {
        let adjustments = Adjustment::ALL
            .iter()
            .map(|a| (*a, self.mirror.adjustments.get(*a)))
            .collect();

        let aspect = AspectRatio::from_override(self.mirror.aspect_override);
        if let Some(ratio) = aspect {
            self.aspect.set(ratio);
        }

        let hwdec_enabled = self.settings.read(|c| c.playback.hardware_decoding);

        OptionsSnapshot {
            adjustments,
            aspect,
            flip_available: flip_available(hwdec_enabled, &self.mirror.hwdec_current),
        }
    }

    /// The hide timer for `token` fired. `blockers` carries the widget-side
    /// conditions; engine-side ones are filled in here.
    pub fn hide_timeout(&mut self, token: HideToken, mut blockers: HideBlockers) -> Vec<ViewUpdate> {
        blockers.engine_idle = self.mirror.idle_active;
        blockers.fullscreen = self.mirror.fullscreen;

        match self.autohide.on_timeout(token, blockers) {
            HideOutcome::Hidden { hide_cursor } => vec![ViewUpdate::HideChrome { hide_cursor }],
            HideOutcome::Kept | HideOutcome::Stale => Vec::new(),
        }
    }

    pub fn chapter_hover(&self, x: f64, width: f64) -> Option<ChapterHover> {
        ChapterHover::at(x, width, self.mirror.duration, &self.mirror.chapters)
    }

    /// Apply settings that changed since the last poll.
    pub fn poll_settings(&mut self) -> Vec<ViewUpdate> {
        let keys = match self.subscription.as_mut() {
            Some(subscription) if !self.torn_down => subscription.drain(),
            _ => return Vec::new(),
        };
        if keys.is_empty() {
            return Vec::new();
        }

        let config = self.settings.snapshot();
        let mut out = Vec::new();

        for key in keys {
            debug!("Applying setting {:?}", key);
            if key == SettingKey::Interface {
                self.interface = config.interface.clone();
                out.push(ViewUpdate::InterfaceChanged(self.interface.clone()));
            } else {
                self.dispatch(setting_change_ops(key, &config, &self.conf_hwdec));
            }
        }

        out
    }

    /// Stop reacting to anything. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.autohide.cancel();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        info!("Window controller torn down");
    }
}
