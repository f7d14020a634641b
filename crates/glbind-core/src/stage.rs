//! Shader stages and extension-based stage inference.

use std::fmt;
use std::path::Path;

use gl::types::GLenum;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        Self::Vertex,
        Self::TessControl,
        Self::TessEvaluation,
        Self::Geometry,
        Self::Fragment,
        Self::Compute,
    ];

    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::TessControl => gl::TESS_CONTROL_SHADER,
            Self::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            Self::Geometry => gl::GEOMETRY_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
            Self::Compute => gl::COMPUTE_SHADER,
        }
    }

    /// Extensions (without the dot) recognised for this stage.
    pub fn extensions(self) -> [&'static str; 2] {
        match self {
            Self::Vertex => ["vert", "glslv"],
            Self::TessControl => ["tesc", "tsc"],
            Self::TessEvaluation => ["tese", "tse"],
            Self::Geometry => ["geom", "glslg"],
            Self::Fragment => ["frag", "glslf"],
            Self::Compute => ["comp", "glslc"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.extensions().contains(&ext))
    }

    /// Infer the stage of a shader source file from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| Error::UnknownShaderStage {
                identifier: path.display().to_string(),
            })
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::TessControl => "tessellation control",
            Self::TessEvaluation => "tessellation evaluation",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        })
    }
}
