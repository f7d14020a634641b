//! Process-wide GL function pointer loading.

use anyhow::{bail, Result};
use once_cell::sync::OnceCell;

static GL_LOADED: OnceCell<bool> = OnceCell::new();

/// Load GL function pointers through `gl_loader`.
///
/// Loading happens once per process; later calls return the first outcome.
///
/// # Safety
///
/// A GL context must be current on the calling thread.
pub unsafe fn load_functions() -> Result<()> {
    let loaded = *GL_LOADED.get_or_init(|| {
        gl_loader::init_gl();
        gl::load_with(|s| gl_loader::get_proc_address(s).cast());
        let loaded = gl::GetError::is_loaded()
            && gl::CreateProgram::is_loaded()
            && gl::TexImage2D::is_loaded()
            && gl::BindVertexArray::is_loaded();
        tracing::debug!(loaded, "OpenGL function pointers loaded");
        loaded
    });

    if !loaded {
        bail!("OpenGL entry points could not be loaded; is a context current?");
    }
    Ok(())
}
