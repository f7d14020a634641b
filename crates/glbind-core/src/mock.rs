//! In-memory [`GlApi`] for tests.
//!
//! `MockGl` records every call and emulates the parts of GL state the
//! wrappers touch: object namespaces, binding points, the error queue,
//! buffer and texture storage, shader compilation and program resources.
//!
//! Shader compilation fails when the source contains `#error`. At link time
//! `uniform` declarations from every attached stage and `in` declarations
//! from the vertex stage become the program's active resources, numbered in
//! declaration order.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use gl::types::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};

use crate::api::{GlApi, ObjectKind};
use crate::stage::ShaderStage;

/// One recorded API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: &'static str,
    pub args: String,
}

/// A value stored at a uniform location.
#[derive(Debug, Clone, PartialEq)]
pub enum MockUniform {
    Float { tuple: usize, values: Vec<f32> },
    Int { tuple: usize, values: Vec<i32> },
    Matrix { dim: usize, transpose: bool, values: Vec<f32> },
}

/// State recorded by `glVertexAttribPointer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    pub buffer: GLuint,
    pub size: GLint,
    pub ty: GLenum,
    pub normalized: bool,
    pub stride: GLsizei,
    pub offset: usize,
}

/// Level 0..n image of a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockImage {
    pub width: GLsizei,
    pub height: GLsizei,
    pub internal_format: GLenum,
    pub format: GLenum,
    pub ty: GLenum,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Namespace {
    Buffer,
    Texture,
    Renderbuffer,
    Framebuffer,
    VertexArray,
    ShaderOrProgram,
}

impl From<ObjectKind> for Namespace {
    fn from(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Buffer => Self::Buffer,
            ObjectKind::Texture => Self::Texture,
            ObjectKind::Renderbuffer => Self::Renderbuffer,
            ObjectKind::Framebuffer => Self::Framebuffer,
            ObjectKind::VertexArray => Self::VertexArray,
            ObjectKind::Shader(_) | ObjectKind::Program => Self::ShaderOrProgram,
        }
    }
}

#[derive(Debug, Default)]
struct ShaderState {
    stage: Option<ShaderStage>,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<GLuint>,
    linked: bool,
    info_log: String,
    attributes: HashMap<String, GLint>,
    uniforms: HashMap<String, GLint>,
    values: HashMap<GLint, MockUniform>,
}

#[derive(Debug, Default)]
struct BufferState {
    data: Vec<u8>,
    immutable: bool,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    errors: VecDeque<GLenum>,
    next_name: HashMap<Namespace, GLuint>,
    live: HashSet<(Namespace, GLuint)>,
    /// Names bound at least once; only these are objects in core profile.
    initialized: HashSet<(Namespace, GLuint)>,
    integers: HashMap<GLenum, GLint>,
    framebuffer_status: Option<GLenum>,

    buffer_bindings: HashMap<GLenum, GLuint>,
    active_unit: GLuint,
    texture_bindings: HashMap<(GLuint, GLenum), GLuint>,
    renderbuffer: GLuint,
    draw_framebuffer: GLuint,
    read_framebuffer: GLuint,
    vertex_array: GLuint,
    program: GLuint,
    viewport: [GLint; 4],
    capabilities: HashSet<GLenum>,
    pixel_store: HashMap<GLenum, GLint>,

    buffers: HashMap<GLuint, BufferState>,
    textures: HashMap<(GLuint, GLint), MockImage>,
    texture_parameters: HashMap<(GLuint, GLenum), f64>,
    renderbuffers: HashMap<GLuint, (GLenum, GLsizei, GLsizei)>,
    attachments: HashMap<GLuint, BTreeMap<GLenum, GLuint>>,
    shaders: HashMap<GLuint, ShaderState>,
    programs: HashMap<GLuint, ProgramState>,
    enabled_attribs: HashSet<GLuint>,
    attrib_pointers: HashMap<GLuint, AttribPointer>,
    draws: usize,
}

impl State {
    fn error(&mut self, code: GLenum) {
        self.errors.push_back(code);
    }

    fn is_live(&self, ns: Namespace, id: GLuint) -> bool {
        self.live.contains(&(ns, id))
    }

    /// Binding a name that was never generated is an error in core profile.
    fn check_bindable(&mut self, ns: Namespace, id: GLuint) -> bool {
        if id == 0 {
            true
        } else if self.is_live(ns, id) {
            self.initialized.insert((ns, id));
            true
        } else {
            self.error(gl::INVALID_OPERATION);
            false
        }
    }

    fn integer(&self, pname: GLenum) -> GLint {
        if let Some(value) = self.integers.get(&pname) {
            return *value;
        }
        match pname {
            gl::MAX_TEXTURE_IMAGE_UNITS => 16,
            gl::MAX_VERTEX_ATTRIBS => 16,
            gl::CURRENT_PROGRAM => self.program as GLint,
            gl::VERTEX_ARRAY_BINDING => self.vertex_array as GLint,
            gl::ARRAY_BUFFER_BINDING => self.bound_buffer(gl::ARRAY_BUFFER) as GLint,
            gl::ELEMENT_ARRAY_BUFFER_BINDING => {
                self.bound_buffer(gl::ELEMENT_ARRAY_BUFFER) as GLint
            }
            gl::ACTIVE_TEXTURE => (gl::TEXTURE0 + self.active_unit) as GLint,
            gl::TEXTURE_BINDING_2D => self.bound_texture(self.active_unit) as GLint,
            gl::RENDERBUFFER_BINDING => self.renderbuffer as GLint,
            gl::DRAW_FRAMEBUFFER_BINDING => self.draw_framebuffer as GLint,
            gl::READ_FRAMEBUFFER_BINDING => self.read_framebuffer as GLint,
            gl::PACK_ALIGNMENT | gl::UNPACK_ALIGNMENT => {
                self.pixel_store.get(&pname).copied().unwrap_or(4)
            }
            _ => 0,
        }
    }

    fn bound_buffer(&self, target: GLenum) -> GLuint {
        self.buffer_bindings.get(&target).copied().unwrap_or(0)
    }

    fn bound_texture(&self, unit: GLuint) -> GLuint {
        self.texture_bindings
            .get(&(unit, gl::TEXTURE_2D))
            .copied()
            .unwrap_or(0)
    }

    fn framebuffer_for(&self, target: GLenum) -> GLuint {
        match target {
            gl::READ_FRAMEBUFFER => self.read_framebuffer,
            _ => self.draw_framebuffer,
        }
    }

    /// Location -1 is silently ignored, as in GL.
    fn set_uniform(&mut self, location: GLint, value: MockUniform) {
        if location == -1 {
            return;
        }
        let stored = match self.programs.get_mut(&self.program) {
            Some(program) if program.uniforms.values().any(|l| *l == location) => {
                program.values.insert(location, value);
                true
            }
            _ => false,
        };
        if !stored {
            self.error(gl::INVALID_OPERATION);
        }
    }

    fn link(&mut self, program: GLuint) {
        let attached = match self.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => {
                self.error(gl::INVALID_VALUE);
                return;
            }
        };

        let mut info_log = String::new();
        let mut attributes = HashMap::new();
        let mut uniforms = HashMap::new();

        if attached.is_empty() {
            info_log = "error: no shaders attached to the program".to_string();
        }
        for id in &attached {
            let Some(shader) = self.shaders.get(id) else {
                continue;
            };
            if !shader.compiled {
                info_log = format!("error: shader {id} is not compiled");
                break;
            }
            for line in shader.source.lines() {
                let tokens: Vec<_> = line.split_whitespace().collect();
                let Some(last) = tokens.last() else { continue };
                let name = last.trim_end_matches(';');
                let name = name.split('[').next().unwrap_or(name).to_string();
                match tokens.first() {
                    Some(&"uniform") => {
                        let next = uniforms.len() as GLint;
                        uniforms.entry(name).or_insert(next);
                    }
                    Some(&"in") | Some(&"attribute")
                        if shader.stage == Some(ShaderStage::Vertex) =>
                    {
                        let next = attributes.len() as GLint;
                        attributes.entry(name).or_insert(next);
                    }
                    _ => {}
                }
            }
        }

        let Some(state) = self.programs.get_mut(&program) else {
            return;
        };
        state.linked = info_log.is_empty();
        state.info_log = info_log;
        state.values.clear();
        if state.linked {
            state.attributes = attributes;
            state.uniforms = uniforms;
        } else {
            state.attributes.clear();
            state.uniforms.clear();
        }
    }
}

/// Recording in-memory implementation of [`GlApi`].
#[derive(Debug, Default)]
pub struct MockGl {
    state: RefCell<State>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, name: &'static str, args: String) -> std::cell::RefMut<'_, State> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call { name, args });
        state
    }

    // Test controls

    /// Queue an error to be returned by the next `glGetError`.
    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Override a `glGetIntegerv` query.
    pub fn set_integer(&self, pname: GLenum, value: GLint) {
        self.state.borrow_mut().integers.insert(pname, value);
    }

    /// Force the result of `glCheckFramebufferStatus`.
    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.state.borrow_mut().framebuffer_status = Some(status);
    }

    // Inspection

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(|c| c.name).collect()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.name == name)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn pending_errors(&self) -> usize {
        self.state.borrow().errors.len()
    }

    pub fn is_live(&self, kind: ObjectKind, id: GLuint) -> bool {
        self.state.borrow().is_live(kind.into(), id)
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().program
    }

    pub fn bound_vertex_array(&self) -> GLuint {
        self.state.borrow().vertex_array
    }

    pub fn bound_buffer(&self, target: GLenum) -> GLuint {
        self.state.borrow().bound_buffer(target)
    }

    /// Texture bound to `GL_TEXTURE_2D` on unit `n`.
    pub fn bound_texture(&self, unit: GLuint) -> GLuint {
        self.state.borrow().bound_texture(unit)
    }

    pub fn bound_framebuffer(&self) -> GLuint {
        self.state.borrow().draw_framebuffer
    }

    pub fn buffer_contents(&self, id: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).map(|b| b.data.clone())
    }

    pub fn texture_image(&self, id: GLuint, level: GLint) -> Option<MockImage> {
        self.state.borrow().textures.get(&(id, level)).cloned()
    }

    pub fn texture_parameter(&self, id: GLuint, pname: GLenum) -> Option<f64> {
        self.state
            .borrow()
            .texture_parameters
            .get(&(id, pname))
            .copied()
    }

    pub fn renderbuffer_storage_of(&self, id: GLuint) -> Option<(GLenum, GLsizei, GLsizei)> {
        self.state.borrow().renderbuffers.get(&id).copied()
    }

    /// Attachment point to attached object name, for framebuffer `id`.
    pub fn attachments(&self, id: GLuint) -> BTreeMap<GLenum, GLuint> {
        self.state
            .borrow()
            .attachments
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn attached_shaders(&self, program: GLuint) -> Vec<GLuint> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub fn uniform(&self, program: GLuint, name: &str) -> Option<MockUniform> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.get(name)?;
        program.values.get(location).cloned()
    }

    pub fn uniform_values(&self, program: GLuint) -> HashMap<GLint, MockUniform> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    pub fn is_attrib_enabled(&self, index: GLuint) -> bool {
        self.state.borrow().enabled_attribs.contains(&index)
    }

    pub fn attrib_pointer(&self, index: GLuint) -> Option<AttribPointer> {
        self.state.borrow().attrib_pointers.get(&index).copied()
    }

    pub fn is_enabled(&self, cap: GLenum) -> bool {
        self.state.borrow().capabilities.contains(&cap)
    }

    pub fn draw_count(&self) -> usize {
        self.state.borrow().draws
    }
}

impl GlApi for MockGl {
    fn create_object(&self, kind: ObjectKind) -> GLuint {
        let mut state = self.record("create_object", format!("{}", kind.name()));
        let ns = Namespace::from(kind);
        let next = state.next_name.entry(ns).or_insert(0);
        *next += 1;
        let id = *next;
        state.live.insert((ns, id));
        match kind {
            ObjectKind::Shader(stage) => {
                state.shaders.insert(
                    id,
                    ShaderState {
                        stage: Some(stage),
                        ..Default::default()
                    },
                );
            }
            ObjectKind::Program => {
                state.programs.insert(id, ProgramState::default());
            }
            ObjectKind::Buffer => {
                state.buffers.insert(id, BufferState::default());
            }
            _ => {}
        }
        id
    }

    fn delete_object(&self, kind: ObjectKind, id: GLuint) {
        let mut state = self.record("delete_object", format!("{}, {id}", kind.name()));
        if id == 0 {
            return;
        }
        let ns = Namespace::from(kind);
        if !state.live.remove(&(ns, id)) {
            return;
        }
        state.initialized.remove(&(ns, id));
        match kind {
            ObjectKind::Buffer => {
                state.buffers.remove(&id);
                state.buffer_bindings.retain(|_, bound| *bound != id);
            }
            ObjectKind::Texture => {
                state.textures.retain(|(tex, _), _| *tex != id);
                state.texture_bindings.retain(|_, bound| *bound != id);
            }
            ObjectKind::Renderbuffer => {
                state.renderbuffers.remove(&id);
                if state.renderbuffer == id {
                    state.renderbuffer = 0;
                }
            }
            ObjectKind::Framebuffer => {
                state.attachments.remove(&id);
                if state.draw_framebuffer == id {
                    state.draw_framebuffer = 0;
                }
                if state.read_framebuffer == id {
                    state.read_framebuffer = 0;
                }
            }
            ObjectKind::VertexArray => {
                if state.vertex_array == id {
                    state.vertex_array = 0;
                }
            }
            ObjectKind::Shader(_) => {
                state.shaders.remove(&id);
            }
            ObjectKind::Program => {
                state.programs.remove(&id);
                if state.program == id {
                    state.program = 0;
                }
            }
        }
    }

    fn get_error(&self) -> GLenum {
        let mut state = self.state.borrow_mut();
        state.errors.pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn get_integer(&self, pname: GLenum) -> GLint {
        let state = self.record("get_integer", format!("{pname:#06x}"));
        state.integer(pname)
    }

    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]) {
        let state = self.record("get_integer_v", format!("{pname:#06x}"));
        if pname == gl::VIEWPORT {
            for (dst, src) in out.iter_mut().zip(state.viewport) {
                *dst = src;
            }
        } else if let Some(first) = out.first_mut() {
            *first = state.integer(pname);
        }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        let state = self.record("check_framebuffer_status", format!("{target:#06x}"));
        if let Some(status) = state.framebuffer_status {
            return status;
        }
        let fb = state.framebuffer_for(target);
        if fb == 0 {
            return gl::FRAMEBUFFER_COMPLETE;
        }
        match state.attachments.get(&fb) {
            Some(points) if !points.is_empty() => gl::FRAMEBUFFER_COMPLETE,
            _ => gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
        }
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        let mut state = self.record("bind_buffer", format!("{target:#06x}, {id}"));
        if state.check_bindable(Namespace::Buffer, id) {
            state.buffer_bindings.insert(target, id);
        }
    }

    fn bind_texture(&self, target: GLenum, id: GLuint) {
        let mut state = self.record("bind_texture", format!("{target:#06x}, {id}"));
        if state.check_bindable(Namespace::Texture, id) {
            let unit = state.active_unit;
            state.texture_bindings.insert((unit, target), id);
        }
    }

    fn active_texture(&self, unit: GLenum) {
        let mut state = self.record("active_texture", format!("{}", unit.wrapping_sub(gl::TEXTURE0)));
        let max = state.integer(gl::MAX_TEXTURE_IMAGE_UNITS) as GLuint;
        match unit.checked_sub(gl::TEXTURE0) {
            Some(index) if index < max => state.active_unit = index,
            _ => state.error(gl::INVALID_ENUM),
        }
    }

    fn bind_renderbuffer(&self, id: GLuint) {
        let mut state = self.record("bind_renderbuffer", format!("{id}"));
        if state.check_bindable(Namespace::Renderbuffer, id) {
            state.renderbuffer = id;
        }
    }

    fn bind_framebuffer(&self, target: GLenum, id: GLuint) {
        let mut state = self.record("bind_framebuffer", format!("{target:#06x}, {id}"));
        if !state.check_bindable(Namespace::Framebuffer, id) {
            return;
        }
        match target {
            gl::FRAMEBUFFER => {
                state.draw_framebuffer = id;
                state.read_framebuffer = id;
            }
            gl::DRAW_FRAMEBUFFER => state.draw_framebuffer = id,
            gl::READ_FRAMEBUFFER => state.read_framebuffer = id,
            _ => state.error(gl::INVALID_ENUM),
        }
    }

    fn bind_vertex_array(&self, id: GLuint) {
        let mut state = self.record("bind_vertex_array", format!("{id}"));
        if state.check_bindable(Namespace::VertexArray, id) {
            state.vertex_array = id;
        }
    }

    fn use_program(&self, id: GLuint) {
        let mut state = self.record("use_program", format!("{id}"));
        if id == 0 {
            state.program = 0;
            return;
        }
        match state.programs.get(&id).map(|p| p.linked) {
            Some(true) => state.program = id,
            Some(false) => state.error(gl::INVALID_OPERATION),
            None => state.error(gl::INVALID_VALUE),
        }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        let mut state = self.record("buffer_data", format!("{target:#06x}, {size}, {usage:#06x}"));
        let bound = state.bound_buffer(target);
        let Some(buffer) = state.buffers.get_mut(&bound) else {
            state.error(gl::INVALID_OPERATION);
            return;
        };
        if buffer.immutable {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        buffer.data = data.map(<[u8]>::to_vec).unwrap_or_else(|| vec![0; size]);
    }

    fn buffer_storage(&self, target: GLenum, size: usize, data: Option<&[u8]>, flags: GLbitfield) {
        let mut state =
            self.record("buffer_storage", format!("{target:#06x}, {size}, {flags:#06x}"));
        let bound = state.bound_buffer(target);
        let Some(buffer) = state.buffers.get_mut(&bound) else {
            state.error(gl::INVALID_OPERATION);
            return;
        };
        if buffer.immutable {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        buffer.immutable = true;
        buffer.data = data.map(<[u8]>::to_vec).unwrap_or_else(|| vec![0; size]);
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        let mut state =
            self.record("buffer_sub_data", format!("{target:#06x}, {offset}, {}", data.len()));
        let bound = state.bound_buffer(target);
        let Some(buffer) = state.buffers.get_mut(&bound) else {
            state.error(gl::INVALID_OPERATION);
            return;
        };
        match buffer.data.get_mut(offset..offset + data.len()) {
            Some(dst) => dst.copy_from_slice(data),
            None => state.error(gl::INVALID_VALUE),
        }
    }

    fn renderbuffer_storage(&self, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        let mut state = self.record(
            "renderbuffer_storage",
            format!("{internal_format:#06x}, {width}, {height}"),
        );
        let id = state.renderbuffer;
        if id == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.renderbuffers.insert(id, (internal_format, width, height));
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        data: Option<&[u8]>,
    ) {
        let mut state = self.record(
            "tex_image_2d",
            format!("{target:#06x}, {level}, {internal_format:#06x}, {width}, {height}, {format:#06x}, {ty:#06x}"),
        );
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        if id == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        if width < 0 || height < 0 || level < 0 {
            state.error(gl::INVALID_VALUE);
            return;
        }
        let packed_depth_stencil = matches!(ty, gl::UNSIGNED_INT_24_8 | gl::FLOAT_32_UNSIGNED_INT_24_8_REV);
        if (format == gl::DEPTH_STENCIL) != packed_depth_stencil
            || (internal_format == gl::DEPTH24_STENCIL8 && format != gl::DEPTH_STENCIL)
        {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        let data = data.map(<[u8]>::to_vec).unwrap_or_default();
        state.textures.insert(
            (id, level),
            MockImage {
                width,
                height,
                internal_format,
                format,
                ty,
                data,
            },
        );
    }

    fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        let mut state = self.record(
            "get_tex_image",
            format!("{target:#06x}, {level}, {format:#06x}, {ty:#06x}"),
        );
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        // Matches glGetnTexImage: a destination too small for the level is
        // an error and nothing is written.
        let written = match state.textures.get(&(id, level)) {
            Some(image) if out.len() >= image.data.len() => {
                out[..image.data.len()].copy_from_slice(&image.data);
                true
            }
            _ => false,
        };
        if !written {
            state.error(gl::INVALID_OPERATION);
        }
    }

    fn get_tex_level_parameter_i(&self, target: GLenum, level: GLint, pname: GLenum) -> GLint {
        let mut state = self.record(
            "get_tex_level_parameter_i",
            format!("{target:#06x}, {level}, {pname:#06x}"),
        );
        if level < 0 {
            state.error(gl::INVALID_VALUE);
            return 0;
        }
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        let image = state.textures.get(&(id, level));
        let value = match pname {
            gl::TEXTURE_WIDTH => image.map(|i| i.width),
            gl::TEXTURE_HEIGHT => image.map(|i| i.height),
            gl::TEXTURE_INTERNAL_FORMAT => image.map(|i| i.internal_format as GLint),
            _ => {
                state.error(gl::INVALID_ENUM);
                return 0;
            }
        };
        value.unwrap_or(0)
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        let mut state =
            self.record("tex_parameter_i", format!("{target:#06x}, {pname:#06x}, {param}"));
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        if id == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.texture_parameters.insert((id, pname), param as f64);
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        let mut state =
            self.record("tex_parameter_f", format!("{target:#06x}, {pname:#06x}, {param}"));
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        if id == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.texture_parameters.insert((id, pname), param as f64);
    }

    fn generate_mipmap(&self, target: GLenum) {
        let mut state = self.record("generate_mipmap", format!("{target:#06x}"));
        let unit = state.active_unit;
        let id = state.texture_bindings.get(&(unit, target)).copied().unwrap_or(0);
        if !state.textures.contains_key(&(id, 0)) {
            state.error(gl::INVALID_OPERATION);
        }
    }

    fn pixel_store_i(&self, pname: GLenum, param: GLint) {
        let mut state = self.record("pixel_store_i", format!("{pname:#06x}, {param}"));
        state.pixel_store.insert(pname, param);
    }

    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        tex_target: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        let mut state = self.record(
            "framebuffer_texture_2d",
            format!("{target:#06x}, {attachment:#06x}, {tex_target:#06x}, {texture}, {level}"),
        );
        let fb = state.framebuffer_for(target);
        if fb == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        if texture != 0 && !state.initialized.contains(&(Namespace::Texture, texture)) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        let points = state.attachments.entry(fb).or_default();
        if texture == 0 {
            points.remove(&attachment);
        } else {
            points.insert(attachment, texture);
        }
    }

    fn framebuffer_renderbuffer(&self, target: GLenum, attachment: GLenum, renderbuffer: GLuint) {
        let mut state = self.record(
            "framebuffer_renderbuffer",
            format!("{target:#06x}, {attachment:#06x}, {renderbuffer}"),
        );
        let fb = state.framebuffer_for(target);
        if fb == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        if renderbuffer != 0 && !state.initialized.contains(&(Namespace::Renderbuffer, renderbuffer)) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        let points = state.attachments.entry(fb).or_default();
        if renderbuffer == 0 {
            points.remove(&attachment);
        } else {
            points.insert(attachment, renderbuffer);
        }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let mut state = self.record("shader_source", format!("{shader}"));
        match state.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => state.error(gl::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        let mut state = self.record("compile_shader", format!("{shader}"));
        let Some(s) = state.shaders.get_mut(&shader) else {
            state.error(gl::INVALID_VALUE);
            return;
        };
        match s.source.lines().position(|l| l.trim_start().starts_with("#error")) {
            Some(line) => {
                s.compiled = false;
                s.info_log = format!("0:{}(1): error: #error directive", line + 1);
            }
            None if s.source.trim().is_empty() => {
                s.compiled = false;
                s.info_log = "0:0(0): error: empty shader source".to_string();
            }
            None => {
                s.compiled = true;
                s.info_log.clear();
            }
        }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut state = self.record("get_shader_iv", format!("{shader}, {pname:#06x}"));
        let Some(s) = state.shaders.get(&shader) else {
            state.error(gl::INVALID_VALUE);
            return 0;
        };
        match pname {
            gl::COMPILE_STATUS => s.compiled as GLint,
            gl::INFO_LOG_LENGTH if s.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => s.info_log.len() as GLint + 1,
            gl::SHADER_TYPE => s.stage.map(|st| st.gl_enum() as GLint).unwrap_or(0),
            _ => {
                state.error(gl::INVALID_ENUM);
                0
            }
        }
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let state = self.record("get_shader_info_log", format!("{shader}"));
        state
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.record("attach_shader", format!("{program}, {shader}"));
        if !state.shaders.contains_key(&shader) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        let Some(p) = state.programs.get_mut(&program) else {
            state.error(gl::INVALID_VALUE);
            return;
        };
        if p.attached.contains(&shader) {
            state.error(gl::INVALID_OPERATION);
        } else {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.record("detach_shader", format!("{program}, {shader}"));
        let Some(p) = state.programs.get_mut(&program) else {
            state.error(gl::INVALID_VALUE);
            return;
        };
        match p.attached.iter().position(|s| *s == shader) {
            Some(index) => {
                p.attached.remove(index);
            }
            None => state.error(gl::INVALID_OPERATION),
        }
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.record("link_program", format!("{program}"));
        state.link(program);
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut state = self.record("get_program_iv", format!("{program}, {pname:#06x}"));
        let Some(p) = state.programs.get(&program) else {
            state.error(gl::INVALID_VALUE);
            return 0;
        };
        match pname {
            gl::LINK_STATUS => p.linked as GLint,
            gl::INFO_LOG_LENGTH if p.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => p.info_log.len() as GLint + 1,
            gl::ATTACHED_SHADERS => p.attached.len() as GLint,
            gl::ACTIVE_ATTRIBUTES => p.attributes.len() as GLint,
            gl::ACTIVE_UNIFORMS => p.uniforms.len() as GLint,
            _ => {
                state.error(gl::INVALID_ENUM);
                0
            }
        }
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let state = self.record("get_program_info_log", format!("{program}"));
        state
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint {
        let mut state = self.record("get_attrib_location", format!("{program}, {name}"));
        let location = state
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .map(|p| p.attributes.get(name).copied().unwrap_or(-1));
        location.unwrap_or_else(|| {
            state.error(gl::INVALID_OPERATION);
            -1
        })
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let mut state = self.record("get_uniform_location", format!("{program}, {name}"));
        let location = state
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .map(|p| p.uniforms.get(name).copied().unwrap_or(-1));
        location.unwrap_or_else(|| {
            state.error(gl::INVALID_OPERATION);
            -1
        })
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        let mut state = self.record("enable_vertex_attrib_array", format!("{index}"));
        if index as GLint >= state.integer(gl::MAX_VERTEX_ATTRIBS) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        state.enabled_attribs.insert(index);
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        let mut state = self.record("disable_vertex_attrib_array", format!("{index}"));
        if index as GLint >= state.integer(gl::MAX_VERTEX_ATTRIBS) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        state.enabled_attribs.remove(&index);
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        let mut state = self.record(
            "vertex_attrib_pointer",
            format!("{index}, {size}, {ty:#06x}, {normalized}, {stride}, {offset}"),
        );
        if index as GLint >= state.integer(gl::MAX_VERTEX_ATTRIBS) || !(1..=4).contains(&size) {
            state.error(gl::INVALID_VALUE);
            return;
        }
        let buffer = state.bound_buffer(gl::ARRAY_BUFFER);
        if buffer == 0 && offset != 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.attrib_pointers.insert(
            index,
            AttribPointer {
                buffer,
                size,
                ty,
                normalized,
                stride,
                offset,
            },
        );
    }

    fn uniform_f(&self, location: GLint, tuple: usize, values: &[GLfloat]) {
        let mut state = self.record("uniform_f", format!("{location}, {tuple}, {values:?}"));
        state.set_uniform(
            location,
            MockUniform::Float {
                tuple,
                values: values.to_vec(),
            },
        );
    }

    fn uniform_i(&self, location: GLint, tuple: usize, values: &[GLint]) {
        let mut state = self.record("uniform_i", format!("{location}, {tuple}, {values:?}"));
        state.set_uniform(
            location,
            MockUniform::Int {
                tuple,
                values: values.to_vec(),
            },
        );
    }

    fn uniform_matrix_f(&self, location: GLint, dim: usize, transpose: bool, values: &[GLfloat]) {
        let mut state = self.record(
            "uniform_matrix_f",
            format!("{location}, {dim}, {transpose}, {values:?}"),
        );
        state.set_uniform(
            location,
            MockUniform::Matrix {
                dim,
                transpose,
                values: values.to_vec(),
            },
        );
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        let mut state = self.record("draw_arrays", format!("{mode:#06x}, {first}, {count}"));
        if state.program == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.draws += 1;
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, ty: GLenum, offset: usize) {
        let mut state = self.record(
            "draw_elements",
            format!("{mode:#06x}, {count}, {ty:#06x}, {offset}"),
        );
        if state.program == 0 || state.bound_buffer(gl::ELEMENT_ARRAY_BUFFER) == 0 {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        state.draws += 1;
    }

    fn clear(&self, mask: GLbitfield) {
        self.record("clear", format!("{mask:#06x}"));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        let mut state = self.record("viewport", format!("{x}, {y}, {width}, {height}"));
        if width < 0 || height < 0 {
            state.error(gl::INVALID_VALUE);
            return;
        }
        state.viewport = [x, y, width, height];
    }

    fn enable(&self, cap: GLenum) {
        let mut state = self.record("enable", format!("{cap:#06x}"));
        state.capabilities.insert(cap);
    }

    fn disable(&self, cap: GLenum) {
        let mut state = self.record("disable", format!("{cap:#06x}"));
        state.capabilities.remove(&cap);
    }
}
