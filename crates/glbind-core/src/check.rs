//! GL error queue draining.
//!
//! [`check_errors`] runs after every state-changing call. It reads the queue
//! until it is empty so a stale error never shows up in the diagnosis of a
//! later, unrelated call.

use tracing::warn;

use crate::api::GlApi;
use crate::error::{CallSite, Error, FramebufferStatus, GlErrorCode, Result};

/// Upper bound on queue reads; a lost context may report errors forever.
const MAX_DRAINED_ERRORS: usize = 64;

/// Drain the error queue, failing with the first pending error.
///
/// The reported site is the caller's location.
#[track_caller]
pub fn check_errors(gl: &dyn GlApi) -> Result<()> {
    check_errors_at(gl, CallSite::caller())
}

/// [`check_errors`] with an explicit call site.
pub fn check_errors_at(gl: &dyn GlApi, site: CallSite) -> Result<()> {
    let mut first: Option<Error> = None;

    for _ in 0..MAX_DRAINED_ERRORS {
        let raw = gl.get_error();
        if raw == gl::NO_ERROR {
            break;
        }
        let code = GlErrorCode::from_raw(raw);
        if first.is_some() {
            warn!(%site, %code, "additional OpenGL error drained");
            continue;
        }
        let detail = match code {
            GlErrorCode::InvalidFramebufferOperation => Some(FramebufferStatus::from_raw(
                gl.check_framebuffer_status(gl::DRAW_FRAMEBUFFER),
            )),
            _ => None,
        };
        first = Some(Error::Gl { code, site, detail });
    }

    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Discard every pending error without reporting it.
///
/// Context loaders use this once after setup, where some drivers leave a
/// spurious `INVALID_ENUM` behind.
pub fn clear_errors(gl: &dyn GlApi) {
    for _ in 0..MAX_DRAINED_ERRORS {
        if gl.get_error() == gl::NO_ERROR {
            break;
        }
    }
}
