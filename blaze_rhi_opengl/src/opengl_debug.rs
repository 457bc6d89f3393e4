//! OpenGL debug output - forwards KHR_debug driver messages to the RHI log
//!
//! Messages are filtered by the configured `DebugSeverity`, counted in
//! `ValidationStats` and logged under the `blaze::opengl::debug` source.
//!
//! The callback runs inside the driver, so it never panics. With
//! `panic_on_validation_error` it only remembers the first error; the device
//! raises it at the next `flush`, `finish` or `present`.

use std::ffi::c_void;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use blaze_rhi::blaze::rhi::DebugSeverity;
use blaze_rhi::{rhi_debug, rhi_error, rhi_info, rhi_warn};
use colored::*;
use gl::types::{GLchar, GLenum, GLsizei, GLuint};

const SOURCE: &str = "blaze::opengl::debug";

/// Global debug configuration (read by the callback)
static DEBUG_CONFIG: Mutex<Option<DebugConfig>> = Mutex::new(None);

/// Global validation statistics (thread-safe atomic counters)
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// First driver error seen since the last check
static PENDING_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// Debug configuration for the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugConfig {
    pub severity: DebugSeverity,
    pub panic_on_error: bool,
}

/// Counters of forwarded driver messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub performance: u32,
    pub info: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.performance + self.info
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    performance: AtomicU32,
    info: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            performance: AtomicU32::new(0),
            info: AtomicU32::new(0),
        }
    }

    fn increment(&self, class: MessageClass) {
        let counter = match class {
            MessageClass::Error => &self.errors,
            MessageClass::Warning => &self.warnings,
            MessageClass::Performance => &self.performance,
            MessageClass::Info => &self.info,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            performance: self.performance.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.performance.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
// Classification (pure)
// ============================================================================

/// What a driver message is reported as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Error,
    Warning,
    Performance,
    Info,
}

/// Classify a driver message, None for our own markers and debug groups
pub fn classify(gl_type: GLenum, gl_severity: GLenum) -> Option<MessageClass> {
    match gl_type {
        gl::DEBUG_TYPE_MARKER | gl::DEBUG_TYPE_PUSH_GROUP | gl::DEBUG_TYPE_POP_GROUP => None,
        gl::DEBUG_TYPE_ERROR => Some(MessageClass::Error),
        _ if gl_severity == gl::DEBUG_SEVERITY_HIGH => Some(MessageClass::Error),
        gl::DEBUG_TYPE_PERFORMANCE => Some(MessageClass::Performance),
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR | gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR | gl::DEBUG_TYPE_PORTABILITY => {
            Some(MessageClass::Warning)
        }
        _ if gl_severity == gl::DEBUG_SEVERITY_MEDIUM => Some(MessageClass::Warning),
        _ => Some(MessageClass::Info),
    }
}

pub fn should_forward(severity: DebugSeverity, class: MessageClass) -> bool {
    match severity {
        DebugSeverity::ErrorsOnly => class == MessageClass::Error,
        DebugSeverity::ErrorsAndWarnings => matches!(class, MessageClass::Error | MessageClass::Warning),
        DebugSeverity::All => true,
    }
}

pub fn source_name(source: GLenum) -> &'static str {
    match source {
        gl::DEBUG_SOURCE_API => "API",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        gl::DEBUG_SOURCE_APPLICATION => "Application",
        _ => "Other",
    }
}

pub fn type_name(gl_type: GLenum) -> &'static str {
    match gl_type {
        gl::DEBUG_TYPE_ERROR => "Error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        gl::DEBUG_TYPE_PORTABILITY => "Portability",
        gl::DEBUG_TYPE_PERFORMANCE => "Performance",
        _ => "Other",
    }
}

/// One log line for a driver message
pub fn format_message(source: GLenum, gl_type: GLenum, id: GLuint, message: &str) -> String {
    format!("[{}] [{}] (id {}) {}", source_name(source), type_name(gl_type), id, message.trim_end())
}

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Set the callback configuration and reset statistics
pub fn init_debug_config(config: DebugConfig) {
    VALIDATION_STATS.reset();
    if let Ok(mut pending) = PENDING_ERROR.lock() {
        *pending = None;
    }
    if let Ok(mut guard) = DEBUG_CONFIG.lock() {
        *guard = Some(config);
    }
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

pub fn reset_validation_stats() {
    VALIDATION_STATS.reset();
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No OpenGL debug messages".green().bold());
        return;
    }

    println!("\n{}", "=== OpenGL Debug Output Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.performance > 0 {
        println!("  {} {}", "Performance:".magenta(), stats.performance);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    println!("{}\n", "==================================".bright_blue().bold());
}

/// Record a classified message: count it, log it, remember errors
fn report(config: DebugConfig, class: MessageClass, text: String) {
    VALIDATION_STATS.increment(class);
    match class {
        MessageClass::Error => {
            rhi_error!(SOURCE, "{}", text);
            if config.panic_on_error {
                if let Ok(mut pending) = PENDING_ERROR.lock() {
                    pending.get_or_insert(text);
                }
            }
        }
        MessageClass::Warning => rhi_warn!(SOURCE, "{}", text),
        MessageClass::Performance => rhi_info!(SOURCE, "{}", text),
        MessageClass::Info => rhi_debug!(SOURCE, "{}", text),
    }
}

/// Take the error remembered for `panic_on_validation_error`
pub fn take_pending_error() -> Option<String> {
    PENDING_ERROR.lock().ok().and_then(|mut pending| pending.take())
}

/// Panic if the driver reported an error and strict mode is on
pub fn check_validation_errors() {
    if let Some(message) = take_pending_error() {
        panic!("\n⚠️  PANIC ON OPENGL ERROR (Strict Mode)\nMessage: {}\n", message);
    }
}

// ============================================================================
// Callback
// ============================================================================

/// KHR_debug message callback
extern "system" fn debug_message_callback(
    source: GLenum,
    gl_type: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    _user_param: *mut c_void,
) {
    let config = match DEBUG_CONFIG.lock() {
        Ok(guard) => match *guard {
            Some(config) => config,
            None => return,
        },
        Err(_) => return,
    };
    let Some(class) = classify(gl_type, severity) else {
        return;
    };
    if !should_forward(config.severity, class) {
        return;
    }

    let text = if message.is_null() || length < 0 {
        String::from("No message")
    } else {
        let bytes = unsafe { std::slice::from_raw_parts(message as *const u8, length as usize) };
        String::from_utf8_lossy(bytes).into_owned()
    };
    report(config, class, format_message(source, gl_type, id, &text));
}

/// Enable synchronous debug output with the forwarding callback
#[cfg(feature = "opengl-debug-output")]
pub fn install(config: DebugConfig) {
    if !gl::DebugMessageCallback::is_loaded() {
        rhi_warn!(SOURCE, "KHR_debug unavailable, driver messages won't be forwarded");
        return;
    }
    init_debug_config(config);
    unsafe {
        gl::Enable(gl::DEBUG_OUTPUT);
        gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl::DebugMessageCallback(Some(debug_message_callback), std::ptr::null());
        gl::DebugMessageControl(gl::DONT_CARE, gl::DONT_CARE, gl::DONT_CARE, 0, std::ptr::null(), gl::TRUE);
    }
    rhi_info!(SOURCE, "Debug output enabled ({:?})", config.severity);
}

#[cfg(not(feature = "opengl-debug-output"))]
pub fn install(config: DebugConfig) {
    let _ = debug_message_callback;
    rhi_info!(
        SOURCE,
        "Debug output not compiled in (feature opengl-debug-output), {:?} ignored",
        config.severity
    );
}

// ============================================================================
// Debug groups and markers
// ============================================================================

pub fn push_debug_group(name: &str) {
    if gl::PushDebugGroup::is_loaded() {
        unsafe {
            gl::PushDebugGroup(gl::DEBUG_SOURCE_APPLICATION, 0, name.len() as GLsizei, name.as_ptr() as *const GLchar);
        }
    }
}

pub fn pop_debug_group() {
    if gl::PopDebugGroup::is_loaded() {
        unsafe {
            gl::PopDebugGroup();
        }
    }
}

pub fn insert_debug_marker(name: &str) {
    if gl::DebugMessageInsert::is_loaded() {
        unsafe {
            gl::DebugMessageInsert(
                gl::DEBUG_SOURCE_APPLICATION,
                gl::DEBUG_TYPE_MARKER,
                0,
                gl::DEBUG_SEVERITY_NOTIFICATION,
                name.len() as GLsizei,
                name.as_ptr() as *const GLchar,
            );
        }
    }
}

#[cfg(test)]
#[path = "opengl_debug_tests.rs"]
mod tests;
