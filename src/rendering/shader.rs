use crate::error::RenderError;
use gl::types::*;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::ptr;

/// The two programmable stages this pipeline uses. Being an enum, there is
/// no "invalid stage" value to guard against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// shader program to use to render
pub struct ShaderProgram {
    pub id: GLuint,
    uniform_locations: HashMap<String, GLint>,
    attrib_locations: HashMap<String, GLint>,
}

impl ShaderProgram {
    /// creates a new shader program from vertex and fragment sources
    pub fn new(vertex_src: &str, fragment_src: &str) -> Result<Self, RenderError> {
        let vs = compile_shader(vertex_src, ShaderStage::Vertex)?;
        let fs = compile_shader(fragment_src, ShaderStage::Fragment)?;
        let id = link_program(vs, fs)?;

        let c_out_color = CString::new("out_color").unwrap();
        unsafe {
            gl::BindFragDataLocation(id, 0, c_out_color.as_ptr());
        }

        Ok(Self {
            id,
            uniform_locations: HashMap::new(),
            attrib_locations: HashMap::new(),
        })
    }

    /// registers an uniform location
    pub fn add_unif_location(&mut self, name: &str) {
        let c_name = CString::new(name).unwrap();
        let unif = unsafe { gl::GetUniformLocation(self.id, c_name.as_ptr()) };
        self.uniform_locations.insert(name.to_string(), unif);
    }

    /// registers an attrib location
    pub fn add_attr_location(&mut self, name: &str) {
        let c_name = CString::new(name).unwrap();
        let attr = unsafe { gl::GetAttribLocation(self.id, c_name.as_ptr()) };
        self.attrib_locations.insert(name.to_string(), attr);
    }

    /// gets a registered uniform location
    pub fn get_unif(&self, name: &str) -> GLint {
        *self.uniform_locations.get(name).unwrap()
    }

    /// gets a registered attrib location
    pub fn get_attr(&self, name: &str) -> GLint {
        *self.attrib_locations.get(name).unwrap()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

/// compiles a gl shader stage
fn compile_shader(src: &str, stage: ShaderStage) -> Result<GLuint, RenderError> {
    unsafe {
        let shader = gl::CreateShader(stage.gl_enum());
        let c_str = CString::new(src.as_bytes()).unwrap();
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = gl::FALSE as GLint;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status != (gl::TRUE as GLint) {
            let log = info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog);
            gl::DeleteShader(shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }
        Ok(shader)
    }
}

/// links a gl shader program
fn link_program(vs: GLuint, fs: GLuint) -> Result<GLuint, RenderError> {
    unsafe {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vs);
        gl::AttachShader(program, fs);
        gl::LinkProgram(program);

        // The stage objects are no longer needed once the link has run.
        gl::DetachShader(program, fs);
        gl::DetachShader(program, vs);
        gl::DeleteShader(fs);
        gl::DeleteShader(vs);

        let mut status = gl::FALSE as GLint;
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status != (gl::TRUE as GLint) {
            let log = info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog);
            gl::DeleteProgram(program);
            return Err(RenderError::ProgramLink { log });
        }
        Ok(program)
    }
}

/// retrieves the info log of a shader or program object
unsafe fn info_log(
    object: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut len = 0;
    get_iv(object, gl::INFO_LOG_LENGTH, &mut len);
    if len <= 1 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    get_log(object, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(len as usize - 1); // drop the trailing null character
    String::from_utf8_lossy(&buf).into_owned()
}
