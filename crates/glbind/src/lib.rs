//! Owned wrappers over OpenGL objects and a declarative binding resolver.
//!
//! Every wrapper owns one GL name, creates it on first use and deletes it
//! exactly once on drop. A [`ShaderProgram`] binds its inputs from an
//! ordered slice of [`Binding`]s:
//!
//! ```rust,ignore
//! let gl: glbind::Gl = std::rc::Rc::new(unsafe { glbind_gl::RawGl::load()? });
//! let program = ShaderProgram::from_sources(gl.clone(), &[
//!     ShaderSource::File(Path::new("quad.vert")),
//!     ShaderSource::File(Path::new("quad.frag")),
//! ])?;
//! let positions = Buffer::from_data(gl.clone(), BufferTarget::Array, &QUAD, 2)?;
//! let vao = VertexArray::new(gl.clone());
//!
//! program.bind(&[
//!     Binding::vertex_array(&vao),
//!     Binding::attribute("position", &positions),
//!     Binding::texture("image", &texture),
//!     Binding::uniform("gain", 0.8f32),
//! ])?;
//! Context::new(gl).draw_arrays(Primitive::TriangleStrip, 0, 4)?;
//! ```
//!
//! All calls must happen on the thread whose context is current; [`Gl`] is
//! an `Rc` so wrappers cannot leave it.

pub mod binding;
pub mod buffer;
pub mod context;
pub mod framebuffer;
pub mod image_io;
pub mod logging;
pub mod object;
pub mod program;
pub mod renderbuffer;
pub mod shader;
pub mod state;
pub mod texture;
pub mod vertex_array;

pub use binding::{Binding, Tuple, Uniform};
pub use buffer::{AttributeBuffer, Buffer, BufferDescriptor, BufferTarget, Storage, StorageFlags, Usage};
pub use context::{Context, Primitive};
pub use framebuffer::{Attachable, Attached, AttachmentKind, AttachmentPoint, Framebuffer};
pub use object::{Bindable, GpuObject};
pub use program::{ShaderProgram, ShaderSource};
pub use renderbuffer::Renderbuffer;
pub use shader::Shader;
pub use state::{reset_bindings, SavedBindings};
pub use texture::{Texture2D, TextureParameter};
pub use vertex_array::VertexArray;

pub use glbind_core::{
    BaseFormat, Error, FramebufferStatus, Gl, GlApi, GlScalar, InternalFormat, Result, ShaderStage,
};
