use crate::rendering::shader::ShaderProgram;
use gl::types::*;
use std::ptr;

const QUAD_NUM_VERTICES: usize = 4;
const QUAD_NUM_INDICES: usize = 6;

// Interleaved x, y, u, v per vertex. V runs opposite to Y so that row 0 of
// the uploaded image lands at the top of the drawn frame.
const QUAD_VERTICES: [GLfloat; QUAD_NUM_VERTICES * 4] = [
    0.0, 0.0, 0.0, 1.0, // bottom left
    1.0, 0.0, 1.0, 1.0, // bottom right
    0.0, 1.0, 0.0, 0.0, // top left
    1.0, 1.0, 1.0, 0.0, // top right
];

const QUAD_INDICES: [GLuint; QUAD_NUM_INDICES] = [0, 1, 2, 2, 1, 3];

/// The single unit quad every sprite draw goes through. Built once against
/// the shared program's attribute locations.
pub(crate) struct GeometryQuad {
    vao: GLuint,
    vbo: GLuint,
    ibo: GLuint,
}

impl GeometryQuad {
    /// creates the quad buffers and records the attribute layout
    pub(crate) fn new(program: &ShaderProgram) -> Self {
        let mut vao = 0;
        let mut vbo = 0;
        let mut ibo = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            gl::GenBuffers(1, &mut vbo);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                size_of_val(&QUAD_VERTICES) as GLsizeiptr,
                QUAD_VERTICES.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );

            let stride = (4 * size_of::<GLfloat>()) as GLsizei;
            let pos_attrib = program.get_attr("vertPosition") as GLuint;
            gl::EnableVertexAttribArray(pos_attrib);
            gl::VertexAttribPointer(pos_attrib, 2, gl::FLOAT, gl::FALSE, stride, ptr::null());
            let uv_attrib = program.get_attr("vertUV") as GLuint;
            gl::EnableVertexAttribArray(uv_attrib);
            gl::VertexAttribPointer(
                uv_attrib,
                2,
                gl::FLOAT,
                gl::FALSE,
                stride,
                (2 * size_of::<GLfloat>()) as *const GLvoid,
            );

            gl::GenBuffers(1, &mut ibo);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                size_of_val(&QUAD_INDICES) as GLsizeiptr,
                QUAD_INDICES.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );

            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0);
        }
        log::debug!("shared sprite quad created");

        Self { vao, vbo, ibo }
    }

    /// Draws the quad. The caller has the program bound and all uniforms in
    /// place; no binding survives this call.
    pub(crate) fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawElements(
                gl::TRIANGLES,
                QUAD_NUM_INDICES as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for GeometryQuad {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ibo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}
