use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use libmpv2::Mpv;
use libmpv2_sys::*;
use tracing::{debug, error, info, trace, warn};

use super::engine_config::{init_options, input_conf_ops, post_init_ops};
use super::properties::PlayerProperty;
use super::tracks::{read_chapters, read_tracks};
use super::traits::PlaybackEngine;
use super::types::{EndFileReason, PropertyFormat, PropertyValue};
use crate::constants::{EVENT_WAIT_TIMEOUT_SECS, config_dir, input_conf_path, screenshot_dir};
use crate::events::{EngineEvent, EngineLogLevel, EventSender};
use crate::utils::{CineError, Result};

/// The engine handle shared by the UI thread and the pump thread.
struct Core {
    mpv: Mpv,
    terminating: AtomicBool,
}

// SAFETY: every libmpv client function may be called from any thread.
// mpv_wait_event is only ever called from the pump thread, and the handle
// outlives the pump because `MpvEngine::shutdown` joins it first.
unsafe impl Send for Core {}
unsafe impl Sync for Core {}

impl Core {
    fn ctx(&self) -> *mut mpv_handle {
        self.mpv.ctx.as_ptr()
    }

    fn check_alive(&self) -> Result<()> {
        if self.terminating.load(Ordering::Acquire) {
            Err(CineError::Shutdown)
        } else {
            Ok(())
        }
    }

    /// Null-terminated argv for the raw command API.
    ///
    /// Arguments are passed as-is, so paths with spaces or quotes need no
    /// escaping.
    fn argv(name: &str, args: &[&str]) -> Result<Vec<CString>> {
        std::iter::once(name)
            .chain(args.iter().copied())
            .map(|a| {
                CString::new(a).map_err(|_| CineError::Engine(format!("NUL byte in '{}'", a)))
            })
            .collect()
    }

    /// Hand a property write to the engine without waiting for it.
    fn queue_set(&self, name: &str, value: &PropertyValue) -> Result<()> {
        let c_name = CString::new(name)
            .map_err(|_| CineError::Engine(format!("NUL byte in '{}'", name)))?;
        let ctx = self.ctx();
        let set = |format: mpv_format, data: *mut c_void| {
            // SAFETY: `data` points to a live value of `format`; mpv copies it
            // before returning
            unsafe { mpv_set_property_async(ctx, SET_REPLY_ID, c_name.as_ptr(), format, data) }
        };

        let code = match value {
            PropertyValue::Flag(v) => {
                let mut flag = c_int::from(*v);
                set(mpv_format_MPV_FORMAT_FLAG, (&mut flag as *mut c_int).cast())
            }
            PropertyValue::Int(v) => {
                let mut int = *v;
                set(mpv_format_MPV_FORMAT_INT64, (&mut int as *mut i64).cast())
            }
            PropertyValue::Double(v) => {
                let mut double = *v;
                set(mpv_format_MPV_FORMAT_DOUBLE, (&mut double as *mut f64).cast())
            }
            PropertyValue::None | PropertyValue::Str(_) => {
                let text = CString::new(value.to_engine_string())
                    .map_err(|_| CineError::Engine(format!("NUL byte in {} value", name)))?;
                let mut text_ptr = text.as_ptr();
                set(mpv_format_MPV_FORMAT_STRING, (&mut text_ptr as *mut *const c_char).cast())
            }
        };

        if code < 0 {
            return Err(CineError::Engine(engine_error(code)));
        }
        Ok(())
    }
}

/// Reply id of queued property writes; observed properties start at 1
const SET_REPLY_ID: u64 = 0;

fn engine_error(code: i32) -> String {
    // SAFETY: mpv_error_string returns a static string or null
    unsafe {
        let msg = mpv_error_string(code);
        if msg.is_null() {
            format!("error {}", code)
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl PlaybackEngine for Core {
    fn get_property(&self, name: &str) -> Result<PropertyValue> {
        self.check_alive()?;
        self.mpv
            .get_property::<String>(name)
            .map(PropertyValue::Str)
            .map_err(|e| CineError::Engine(format!("get {}: {:?}", name, e)))
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        self.check_alive()?;
        let result = match &value {
            PropertyValue::None => self.mpv.set_property(name, "no"),
            PropertyValue::Flag(v) => self.mpv.set_property(name, *v),
            PropertyValue::Int(v) => self.mpv.set_property(name, *v),
            PropertyValue::Double(v) => self.mpv.set_property(name, *v),
            PropertyValue::Str(s) => self.mpv.set_property(name, s.as_str()),
        };
        result.map_err(|e| CineError::Engine(format!("set {}={:?}: {:?}", name, value, e)))
    }

    fn set_property_async(&self, name: &str, value: PropertyValue) {
        if self.check_alive().is_err() {
            debug!("Dropping {} write during shutdown", name);
            return;
        }
        if let Err(e) = self.queue_set(name, &value) {
            warn!("Could not queue {}={:?}: {}", name, value, e);
        }
    }

    fn command(&self, name: &str, args: &[&str]) -> Result<()> {
        self.check_alive()?;
        let owned = Self::argv(name, args)?;
        let mut argv: Vec<*const c_char> = owned.iter().map(|a| a.as_ptr()).collect();
        argv.push(ptr::null());

        // SAFETY: argv is null-terminated and its strings outlive the call
        let code = unsafe { mpv_command(self.ctx(), argv.as_mut_ptr()) };
        if code < 0 {
            return Err(CineError::Engine(format!(
                "{} {:?}: {}",
                name,
                args,
                engine_error(code)
            )));
        }
        Ok(())
    }

    fn command_async(&self, name: &str, args: &[&str]) {
        if self.check_alive().is_err() {
            debug!("Dropping '{}' during shutdown", name);
            return;
        }
        let owned = match Self::argv(name, args) {
            Ok(owned) => owned,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        let mut argv: Vec<*const c_char> = owned.iter().map(|a| a.as_ptr()).collect();
        argv.push(ptr::null());

        // SAFETY: argv is null-terminated; mpv copies it before returning
        let code = unsafe { mpv_command_async(self.ctx(), 0, argv.as_mut_ptr()) };
        if code < 0 {
            warn!("Could not queue '{}': {}", name, engine_error(code));
        }
    }

    fn show_text(&self, text: &str) {
        self.command_async("show-text", &[text]);
    }
}

fn mpv_format(format: PropertyFormat) -> mpv_format {
    match format {
        PropertyFormat::None => mpv_format_MPV_FORMAT_NONE,
        PropertyFormat::Flag => mpv_format_MPV_FORMAT_FLAG,
        PropertyFormat::Int => mpv_format_MPV_FORMAT_INT64,
        PropertyFormat::Double => mpv_format_MPV_FORMAT_DOUBLE,
        PropertyFormat::Str => mpv_format_MPV_FORMAT_STRING,
    }
}

/// libmpv behind the `PlaybackEngine` trait.
///
/// Owns the pump thread that turns engine events into `EngineEvent`s on the
/// bounded queue. Dropping the engine stops the pump before the handle is
/// destroyed; any render context must be freed before that.
pub struct MpvEngine {
    core: Arc<Core>,
    stop: Arc<AtomicBool>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for MpvEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpvEngine")
            .field("terminating", &self.core.terminating.load(Ordering::Relaxed))
            .finish()
    }
}

impl MpvEngine {
    pub fn new(events: EventSender) -> Result<Self> {
        info!("Creating mpv instance");

        // mpv requires LC_NUMERIC to be "C"
        // SAFETY: runs before any other thread of ours touches the locale
        unsafe {
            libc::setlocale(libc::LC_NUMERIC, c"C".as_ptr());
        }

        let options = init_options(&config_dir(), &screenshot_dir());
        let mpv = Mpv::with_initializer(|init| {
            for (name, value) in &options {
                if let Err(e) = init.set_property(name, value.as_str()) {
                    warn!("Option {}={} rejected: {:?}", name, value, e);
                }
            }
            Ok(())
        })
        .map_err(|e| CineError::Engine(format!("Failed to create mpv instance: {:?}", e)))?;

        if let Ok(version) = mpv.get_property::<String>("mpv-version") {
            info!("mpv version: {}", version);
        }

        let core = Arc::new(Core {
            mpv,
            terminating: AtomicBool::new(false),
        });

        // Startup ops wait for the engine so bindings exist before the window shows
        let input_conf = input_conf_path();
        let user_input = input_conf.exists().then_some(input_conf.as_path());
        core.execute_blocking(&post_init_ops());
        core.execute_blocking(&input_conf_ops(user_input));

        // SAFETY: the handle is live and the property names outlive each call
        unsafe {
            mpv_request_log_messages(core.ctx(), c"info".as_ptr());

            for property in PlayerProperty::ALL {
                let name = CString::new(property.name())
                    .map_err(|_| CineError::Engine(property.name().to_string()))?;
                let code = mpv_observe_property(
                    core.ctx(),
                    property.id(),
                    name.as_ptr(),
                    mpv_format(property.format()),
                );
                if code < 0 {
                    warn!("Cannot observe {}: {}", property.name(), engine_error(code));
                }
            }
        }

        let stop = Arc::new(AtomicBool::new(false));
        let pump = {
            let core = core.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("mpv-events".to_string())
                .spawn(move || pump_events(core, stop, events))?
        };

        Ok(Self {
            core,
            stop,
            pump: Mutex::new(Some(pump)),
        })
    }

    /// Raw handle for creating a render context on the UI thread.
    pub(crate) fn raw_handle(&self) -> *mut mpv_handle {
        self.core.ctx()
    }

    /// Stop the pump thread. Idempotent; also run on drop.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        self.core.terminating.store(true, Ordering::Release);
        // SAFETY: the handle stays alive until `core` is dropped
        unsafe { mpv_wakeup(self.core.ctx()) };

        let handle = match self.pump.lock() {
            Ok(mut pump) => pump.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Event pump panicked");
            }
            debug!("Event pump stopped");
        }
    }
}

impl Drop for MpvEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl PlaybackEngine for MpvEngine {
    fn get_property(&self, name: &str) -> Result<PropertyValue> {
        self.core.get_property(name)
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        self.core.set_property(name, value)
    }

    fn set_property_async(&self, name: &str, value: PropertyValue) {
        self.core.set_property_async(name, value)
    }

    fn command(&self, name: &str, args: &[&str]) -> Result<()> {
        self.core.command(name, args)
    }

    fn command_async(&self, name: &str, args: &[&str]) {
        self.core.command_async(name, args)
    }

    fn show_text(&self, text: &str) {
        self.core.show_text(text)
    }
}

#[allow(non_upper_case_globals)]
fn pump_events(core: Arc<Core>, stop: Arc<AtomicBool>, events: EventSender) {
    debug!("Event pump started");

    while !stop.load(Ordering::Acquire) {
        // SAFETY: mpv_wait_event never returns null, and the event stays
        // valid until the next call on this thread
        let event = unsafe { &*mpv_wait_event(core.ctx(), EVENT_WAIT_TIMEOUT_SECS) };

        let converted = match event.event_id {
            mpv_event_id_MPV_EVENT_NONE => continue,
            // SAFETY: the event's data matches its id for the calls below
            mpv_event_id_MPV_EVENT_PROPERTY_CHANGE => unsafe { property_event(&core, event) },
            mpv_event_id_MPV_EVENT_START_FILE => Some(EngineEvent::StartFile),
            mpv_event_id_MPV_EVENT_FILE_LOADED => Some(EngineEvent::FileLoaded),
            mpv_event_id_MPV_EVENT_END_FILE => unsafe { end_file_event(event) },
            mpv_event_id_MPV_EVENT_VIDEO_RECONFIG => {
                match (core.get_i64("dwidth"), core.get_i64("dheight")) {
                    (Some(width), Some(height)) => Some(EngineEvent::VideoSize { width, height }),
                    _ => None,
                }
            }
            mpv_event_id_MPV_EVENT_LOG_MESSAGE => unsafe { log_event(event) },
            mpv_event_id_MPV_EVENT_COMMAND_REPLY => {
                if event.error < 0 {
                    warn!("Async command failed: {}", engine_error(event.error));
                }
                None
            }
            mpv_event_id_MPV_EVENT_SET_PROPERTY_REPLY => {
                if event.error < 0 {
                    warn!("Property write failed: {}", engine_error(event.error));
                }
                None
            }
            mpv_event_id_MPV_EVENT_SHUTDOWN => {
                core.terminating.store(true, Ordering::Release);
                let _ = events.push(EngineEvent::Shutdown);
                break;
            }
            other => {
                trace!("Ignoring engine event {}", other);
                None
            }
        };

        let Some(event) = converted else {
            continue;
        };
        // Engine log lines may be dropped; everything else throttles the pump
        let queued = match event {
            EngineEvent::Log { .. } => events.try_push(event),
            event => events.push(event),
        };
        if queued.is_err() {
            debug!("Event queue closed, stopping pump");
            break;
        }
    }

    debug!("Event pump exiting");
}

/// # Safety
/// `event` must be a property-change event fresh from `mpv_wait_event`.
#[allow(non_upper_case_globals)]
unsafe fn property_event(core: &Core, event: &mpv_event) -> Option<EngineEvent> {
    let property = PlayerProperty::from_id(event.reply_userdata)?;
    if event.data.is_null() {
        return None;
    }
    // SAFETY: property-change events carry an mpv_event_property
    let data = unsafe { &*(event.data as *const mpv_event_property) };

    match property {
        PlayerProperty::TrackList => {
            let count = core.get_i64("track-list/count").unwrap_or(0);
            return Some(EngineEvent::TracksChanged(read_tracks(core, count)));
        }
        PlayerProperty::ChapterList => {
            let count = core.get_i64("chapter-list/count").unwrap_or(0);
            return Some(EngineEvent::ChaptersChanged(read_chapters(core, count)));
        }
        _ => {}
    }

    let value = if data.data.is_null() {
        PropertyValue::None
    } else {
        // SAFETY: `data.data` holds a value of `data.format`
        unsafe {
            match data.format {
                mpv_format_MPV_FORMAT_FLAG => PropertyValue::Flag(*(data.data as *const i32) != 0),
                mpv_format_MPV_FORMAT_INT64 => PropertyValue::Int(*(data.data as *const i64)),
                mpv_format_MPV_FORMAT_DOUBLE => PropertyValue::Double(*(data.data as *const f64)),
                mpv_format_MPV_FORMAT_STRING => {
                    PropertyValue::Str(c_string(*(data.data as *const *const c_char)))
                }
                other => {
                    let err = CineError::PropertyFormat {
                        property: property.name().to_string(),
                        found: other.to_string(),
                    };
                    warn!("{}", err);
                    PropertyValue::None
                }
            }
        }
    };

    Some(EngineEvent::PropertyChanged { property, value })
}

/// # Safety
/// `event` must be an end-file event fresh from `mpv_wait_event`.
unsafe fn end_file_event(event: &mpv_event) -> Option<EngineEvent> {
    if event.data.is_null() {
        return None;
    }
    // SAFETY: end-file events carry an mpv_event_end_file
    let data = unsafe { &*(event.data as *const mpv_event_end_file) };

    #[allow(non_upper_case_globals)]
    let reason = match data.reason {
        mpv_end_file_reason_MPV_END_FILE_REASON_EOF => EndFileReason::Eof,
        mpv_end_file_reason_MPV_END_FILE_REASON_STOP => EndFileReason::Stop,
        mpv_end_file_reason_MPV_END_FILE_REASON_QUIT => EndFileReason::Quit,
        mpv_end_file_reason_MPV_END_FILE_REASON_REDIRECT => EndFileReason::Redirect,
        _ => EndFileReason::Error(engine_error(data.error)),
    };

    Some(EngineEvent::EndFile(reason))
}

/// # Safety
/// `event` must be a log-message event fresh from `mpv_wait_event`.
unsafe fn log_event(event: &mpv_event) -> Option<EngineEvent> {
    if event.data.is_null() {
        return None;
    }
    // SAFETY: log events carry an mpv_event_log_message whose strings are
    // NUL-terminated
    let data = unsafe { &*(event.data as *const mpv_event_log_message) };
    let (prefix, level, text) = unsafe {
        (
            c_string(data.prefix),
            c_string(data.level),
            c_string(data.text),
        )
    };

    Some(EngineEvent::Log {
        level: EngineLogLevel::from_engine(&level),
        prefix,
        text: text.trim_end().to_string(),
    })
}
