use gtk4::{self, glib, prelude::*};
use libmpv2_sys::*;
use once_cell::sync::Lazy;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{CStr, c_char, c_void};
use std::ptr;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::constants::EVENT_DRAIN_INTERVAL;
use crate::player::MpvEngine;
use crate::utils::CineError;

const GL_FRAMEBUFFER_BINDING: u32 = 0x8CA6;

type EglGetProcFn = unsafe extern "C" fn(*const c_char) -> *mut c_void;
type GlGetIntegervFn = unsafe extern "C" fn(u32, *mut i32);

/// eglGetProcAddress, resolved once. Stored as an address so it is Sync.
static EGL_GET_PROC: Lazy<usize> = Lazy::new(|| unsafe {
    libc::dlsym(libc::RTLD_DEFAULT, c"eglGetProcAddress".as_ptr()) as usize
});

/// GL entry points never move once resolved
static PROC_CACHE: Lazy<Mutex<HashMap<String, usize>>> = Lazy::new(|| Mutex::new(HashMap::new()));

unsafe extern "C" fn get_proc_address(_ctx: *mut c_void, name: *const c_char) -> *mut c_void {
    let name_str = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();

    if let Ok(cache) = PROC_CACHE.lock()
        && let Some(&cached) = cache.get(&name_str)
    {
        return cached as *mut c_void;
    }

    let mut func = ptr::null_mut();
    if *EGL_GET_PROC != 0 {
        let get_proc: EglGetProcFn = unsafe { std::mem::transmute(*EGL_GET_PROC) };
        func = unsafe { get_proc(name) };
    }
    // GLX sessions
    if func.is_null() {
        func = unsafe { libc::dlsym(libc::RTLD_DEFAULT, name) };
    }

    if func.is_null() {
        warn!("Failed to get proc address for: {}", name_str);
    }
    if let Ok(mut cache) = PROC_CACHE.lock() {
        cache.insert(name_str, func as usize);
    }

    func
}

/// Framebuffer GTK bound for this frame; it changes when the area resizes.
fn current_fbo() -> i32 {
    static GL_GET_INTEGERV: Lazy<usize> = Lazy::new(|| unsafe {
        get_proc_address(ptr::null_mut(), c"glGetIntegerv".as_ptr()) as usize
    });

    let mut fbo = 0i32;
    if *GL_GET_INTEGERV != 0 {
        unsafe {
            let get_integerv: GlGetIntegervFn = std::mem::transmute(*GL_GET_INTEGERV);
            get_integerv(GL_FRAMEBUFFER_BINDING, &mut fbo);
        }
    }
    fbo
}

unsafe extern "C" fn on_render_update(ctx: *mut c_void) {
    // Runs on an engine thread: only flag the frame, the UI timer renders it
    let frame_pending = unsafe { &*(ctx as *const AtomicBool) };
    frame_pending.store(true, Ordering::Release);
}

struct RenderState {
    engine: Arc<MpvEngine>,
    context: Cell<*mut mpv_render_context>,
    frame_pending: Arc<AtomicBool>,
    timer: RefCell<Option<glib::SourceId>>,
}

impl RenderState {
    fn create_context(&self, gl_area: &gtk4::GLArea) -> crate::Result<()> {
        gl_area.make_current();
        if let Some(error) = gl_area.error() {
            return Err(CineError::Render(format!("GLArea has an error: {}", error)));
        }
        if gl_area.context().is_none() {
            return Err(CineError::Render("GLArea has no GL context".to_string()));
        }

        let opengl_params = mpv_opengl_init_params {
            get_proc_address: Some(get_proc_address),
            get_proc_address_ctx: ptr::null_mut(),
        };
        let mut params = [
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_API_TYPE,
                data: c"opengl".as_ptr() as *mut c_void,
            },
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_INIT_PARAMS,
                data: &opengl_params as *const _ as *mut c_void,
            },
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
                data: ptr::null_mut(),
            },
        ];

        let mut context: *mut mpv_render_context = ptr::null_mut();
        let result = unsafe {
            mpv_render_context_create(&mut context, self.engine.raw_handle(), params.as_mut_ptr())
        };
        if result < 0 {
            return Err(CineError::Render(format!(
                "Failed to create render context ({})",
                result
            )));
        }

        unsafe {
            mpv_render_context_set_update_callback(
                context,
                Some(on_render_update),
                Arc::as_ptr(&self.frame_pending) as *mut c_void,
            );
        }
        self.context.set(context);
        info!("OpenGL render context initialized");
        Ok(())
    }

    fn render(&self, gl_area: &gtk4::GLArea) -> crate::Result<()> {
        let context = self.context.get();
        if context.is_null() {
            return Ok(());
        }

        let (width, height) = (
            gl_area.width() * gl_area.scale_factor(),
            gl_area.height() * gl_area.scale_factor(),
        );
        if width <= 0 || height <= 0 {
            return Ok(());
        }

        // GTK also asks for redraws on resize, so the frame is drawn either way
        unsafe { mpv_render_context_update(context) };

        gl_area.attach_buffers();
        let opengl_fbo = mpv_opengl_fbo {
            fbo: current_fbo(),
            w: width,
            h: height,
            internal_format: 0,
        };
        // GTK's framebuffer is upside down relative to mpv's
        let flip_y = 1i32;
        let mut params = [
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_FBO,
                data: &opengl_fbo as *const _ as *mut c_void,
            },
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_FLIP_Y,
                data: &flip_y as *const _ as *mut c_void,
            },
            mpv_render_param {
                type_: mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
                data: ptr::null_mut(),
            },
        ];

        let result = unsafe { mpv_render_context_render(context, params.as_mut_ptr()) };
        if result < 0 {
            return Err(CineError::Render(format!(
                "mpv_render_context_render failed ({})",
                result
            )));
        }
        unsafe { mpv_render_context_report_swap(context) };
        Ok(())
    }

    fn free_context(&self) {
        let context = self.context.replace(ptr::null_mut());
        if !context.is_null() {
            unsafe { mpv_render_context_free(context) };
            debug!("Render context freed");
        }
    }
}

/// GL surface the engine draws into.
#[derive(Clone)]
pub struct VideoArea {
    gl_area: gtk4::GLArea,
    state: Rc<RenderState>,
}

impl std::fmt::Debug for VideoArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoArea")
            .field("gl_area", &"gtk4::GLArea")
            .field("has_context", &!self.state.context.get().is_null())
            .finish()
    }
}

impl VideoArea {
    pub fn new(engine: Arc<MpvEngine>) -> Self {
        let gl_area = gtk4::GLArea::builder()
            .hexpand(true)
            .vexpand(true)
            .focusable(true)
            .auto_render(true)
            .build();

        let state = Rc::new(RenderState {
            engine,
            context: Cell::new(ptr::null_mut()),
            frame_pending: Arc::new(AtomicBool::new(false)),
            timer: RefCell::new(None),
        });

        let state_realize = state.clone();
        gl_area.connect_realize(move |gl_area| {
            debug!("GLArea realized - creating render context");
            if let Err(e) = state_realize.create_context(gl_area) {
                error!("{}", e);
            }
        });

        let state_render = state.clone();
        gl_area.connect_render(move |gl_area, _gl_context| {
            state_render.frame_pending.store(false, Ordering::Release);
            if let Err(e) = state_render.render(gl_area) {
                // Skip this frame; the next update tries again
                error!("{}", e);
            }
            glib::Propagation::Stop
        });

        let state_unrealize = state.clone();
        gl_area.connect_unrealize(move |gl_area| {
            debug!("GLArea unrealized - freeing render context");
            gl_area.make_current();
            state_unrealize.free_context();
        });

        let gl_area_timer = gl_area.clone();
        let frame_pending = state.frame_pending.clone();
        let timer_id = glib::timeout_add_local(EVENT_DRAIN_INTERVAL, move || {
            if frame_pending.load(Ordering::Acquire) {
                gl_area_timer.queue_render();
            }
            glib::ControlFlow::Continue
        });
        state.timer.replace(Some(timer_id));

        Self { gl_area, state }
    }

    pub fn widget(&self) -> &gtk4::GLArea {
        &self.gl_area
    }

    /// Stop rendering and release the render context. Must run before the
    /// engine is destroyed; safe to call more than once.
    pub fn shutdown(&self) {
        if let Some(timer_id) = self.state.timer.borrow_mut().take() {
            timer_id.remove();
        }
        if self.gl_area.is_realized() {
            self.gl_area.make_current();
        }
        self.state.free_context();
    }
}
