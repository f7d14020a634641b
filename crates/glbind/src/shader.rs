use std::path::Path;

use gl::types::GLuint;
use glbind_core::{check_errors, Error, Gl, ObjectKind, Result, ShaderStage};
use tracing::{debug, error};

use crate::object::{GpuObject, Handle};

/// One compiled shader stage.
pub struct Shader {
    handle: Handle,
    stage: ShaderStage,
}

/// Read a shader source file, unmodified.
fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

impl Shader {
    pub fn new(gl: Gl, stage: ShaderStage) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Shader(stage)),
            stage,
        }
    }

    /// Compile `source` as a new `stage` shader.
    #[track_caller]
    pub fn from_source(gl: Gl, stage: ShaderStage, source: &str) -> Result<Self> {
        let shader = Self::new(gl, stage);
        shader.compile_source(source)?;
        Ok(shader)
    }

    /// Compile the file at `path`, inferring the stage from its extension.
    #[track_caller]
    pub fn from_file(gl: Gl, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stage = ShaderStage::from_path(path)?;
        let shader = Self::new(gl, stage);
        shader.compile_file(path)?;
        Ok(shader)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Replace the source and compile it.
    #[track_caller]
    pub fn compile_source(&self, source: &str) -> Result<()> {
        let id = self.handle.ensure()?;
        let gl = self.handle.gl();
        gl.shader_source(id, source);
        check_errors(gl)?;
        gl.compile_shader(id);
        check_errors(gl)?;

        if self.is_compiled() {
            debug!(id, stage = %self.stage, "compiled shader");
            return Ok(());
        }
        let mut info_log = self.info_log();
        if info_log.is_empty() {
            info_log = "compile failed without an info log".to_string();
        }
        error!(id, stage = %self.stage, %info_log, "shader compile failed");
        Err(Error::ShaderCompile {
            stage: self.stage,
            info_log,
        })
    }

    #[track_caller]
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), stage = %self.stage, "compiling");
        let source = read_source(path)?;
        self.compile_source(&source)
    }

    pub fn is_compiled(&self) -> bool {
        match self.handle.id() {
            0 => false,
            id => self.handle.gl().get_shader_iv(id, gl::COMPILE_STATUS) != 0,
        }
    }

    /// The driver's compile log; empty when never created.
    pub fn info_log(&self) -> String {
        match self.handle.id() {
            0 => String::new(),
            id => self.handle.gl().get_shader_info_log(id),
        }
    }
}

impl GpuObject for Shader {
    fn id(&self) -> GLuint {
        self.handle.id()
    }

    #[track_caller]
    fn create(&self) -> Result<()> {
        self.handle.create().map(drop)
    }

    #[track_caller]
    fn release(&self) -> Result<()> {
        self.handle.release()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;

    use super::*;

    #[test]
    fn compile_errors_carry_the_log() {
        let mock = Rc::new(MockGl::new());
        let err = Shader::from_source(mock, ShaderStage::Fragment, "void main() {}\n#error nope\n")
            .err()
            .unwrap();
        match err {
            Error::ShaderCompile { stage, info_log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(info_log.contains("#error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_files_fail_to_read() {
        let mock = Rc::new(MockGl::new());
        let dir = tempfile::tempdir().unwrap();
        let err = Shader::from_file(mock.clone(), dir.path().join("absent.vert")).err().unwrap();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn unknown_extensions_fail_before_any_call() {
        let mock = Rc::new(MockGl::new());
        let err = Shader::from_file(mock.clone(), "shader.txt").err().unwrap();
        assert!(matches!(err, Error::UnknownShaderStage { .. }));
        assert!(mock.calls().is_empty());
    }
}
