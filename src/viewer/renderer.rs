//! OpenGL side of the viewer: one textured quad holding the screenshot,
//! drawn through an egui paint callback.
//!
//! The vertex shader places the quad from the camera state, the fragment
//! shader darkens everything outside the flashlight circle.

use anyhow::{anyhow, bail, Context, Result};
use eframe::egui_glow::ShaderVersion;
use eframe::glow::{self, HasContext};
use tracing::{debug, error};

use crate::screenshot::Screenshot;
use crate::types::Vec2;

const VERTEX_SHADER: &str = r#"
in vec3 aPos;
in vec2 aTexCoord;
out vec2 texcoord;

uniform vec2 cameraPos;
uniform float cameraScale;
uniform vec2 windowSize;
uniform vec2 screenshotSize;

vec3 to_world(vec3 v) {
    vec2 ratio = vec2(
        windowSize.x / screenshotSize.x / cameraScale,
        windowSize.y / screenshotSize.y / cameraScale);
    return vec3(
        (v.x / screenshotSize.x * 2.0 - 1.0) / ratio.x,
        (v.y / screenshotSize.y * 2.0 - 1.0) / ratio.y,
        v.z);
}

void main() {
    gl_Position = vec4(to_world(aPos - vec3(cameraPos * vec2(1.0, -1.0), 0.0)), 1.0);
    texcoord = aTexCoord;
}
"#;

const FRAGMENT_SHADER: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
in vec2 texcoord;
out vec4 color;

uniform sampler2D tex;
uniform vec2 cursorPos;
uniform vec2 windowSize;
uniform float flShadow;
uniform float flRadius;
uniform float cameraScale;

void main() {
    vec4 cursor = vec4(cursorPos.x, windowSize.y - cursorPos.y, 0.0, 1.0);
    float shade = length(cursor - gl_FragCoord) < (flRadius * cameraScale) ? 0.0 : flShadow;
    color = mix(texture(tex, texcoord), vec4(0.0, 0.0, 0.0, 0.0), shade);
}
"#;

const ATTR_POSITION: u32 = 0;
const ATTR_TEXCOORD: u32 = 1;

/// Per-frame shader inputs, all in window pixels except `camera_pos`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub camera_pos: Vec2,
    pub camera_scale: f32,
    pub cursor_pos: Vec2,
    pub fl_shadow: f32,
    pub fl_radius: f32,
}

pub struct ScreenshotRenderer {
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    texture: glow::Texture,
    screenshot_size: Vec2,
}

/// Quad corners as (x, y, z, u, v), in screenshot pixels
fn quad_vertices(width: f32, height: f32) -> [[f32; 5]; 4] {
    [
        [width, 0.0, 0.0, 1.0, 1.0],  // top right
        [width, height, 0.0, 1.0, 0.0], // bottom right
        [0.0, height, 0.0, 0.0, 0.0], // bottom left
        [0.0, 0.0, 0.0, 0.0, 1.0],    // top left
    ]
}

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

impl ScreenshotRenderer {
    pub fn new(gl: &glow::Context, screenshot: &Screenshot) -> Result<Self> {
        let shader_version = ShaderVersion::get(gl);
        debug!(shader_version = ?shader_version, "Detected GLSL version");
        if !shader_version.is_new_shader_interface() {
            bail!("OpenGL context is too old: {shader_version:?} has no in/out shader interface");
        }

        let width = f32::from(screenshot.width);
        let height = f32::from(screenshot.height);
        let vertices: Vec<u8> = quad_vertices(width, height)
            .iter()
            .flatten()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let indices: Vec<u8> = QUAD_INDICES.iter().flat_map(|i| i.to_ne_bytes()).collect();
        let stride = (5 * size_of::<f32>()) as i32;

        unsafe {
            let program = link_program(gl, shader_version)?;

            let vao = gl.create_vertex_array().map_err(|e| anyhow!("Failed to create vertex array: {e}"))?;
            let vbo = gl.create_buffer().map_err(|e| anyhow!("Failed to create vertex buffer: {e}"))?;
            let ebo = gl.create_buffer().map_err(|e| anyhow!("Failed to create index buffer: {e}"))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &vertices, glow::STATIC_DRAW);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, &indices, glow::STATIC_DRAW);

            gl.vertex_attrib_pointer_f32(ATTR_POSITION, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(ATTR_POSITION);
            gl.vertex_attrib_pointer_f32(ATTR_TEXCOORD, 2, glow::FLOAT, false, stride, 3 * size_of::<f32>() as i32);
            gl.enable_vertex_attrib_array(ATTR_TEXCOORD);
            gl.bind_vertex_array(None);

            let texture = gl.create_texture().map_err(|e| anyhow!("Failed to create texture: {e}"))?;
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                i32::from(screenshot.width),
                i32::from(screenshot.height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(screenshot.rgba.as_slice())),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);

            debug!(width = screenshot.width, height = screenshot.height, "Uploaded screenshot texture");

            Ok(Self {
                program,
                vao,
                vbo,
                ebo,
                texture,
                screenshot_size: Vec2::new(width, height),
            })
        }
    }

    /// Draw the quad into the current viewport of `window_size` pixels
    pub fn paint(&self, gl: &glow::Context, uniforms: &Uniforms, window_size: Vec2) {
        unsafe {
            // Alpha only carries the shadow term, the quad is opaque
            gl.disable(glow::BLEND);
            gl.use_program(Some(self.program));

            let uniform_2f = |name: &str, v: Vec2| {
                gl.uniform_2_f32(gl.get_uniform_location(self.program, name).as_ref(), v.x, v.y);
            };
            let uniform_1f = |name: &str, v: f32| {
                gl.uniform_1_f32(gl.get_uniform_location(self.program, name).as_ref(), v);
            };
            uniform_2f("cameraPos", uniforms.camera_pos);
            uniform_1f("cameraScale", uniforms.camera_scale);
            uniform_2f("screenshotSize", self.screenshot_size);
            uniform_2f("windowSize", window_size);
            uniform_2f("cursorPos", uniforms.cursor_pos);
            uniform_1f("flShadow", uniforms.fl_shadow);
            uniform_1f("flRadius", uniforms.fl_radius);
            gl.uniform_1_i32(gl.get_uniform_location(self.program, "tex").as_ref(), 0);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_texture(self.texture);
        }
        debug!("Released GL resources");
    }
}

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    source: &str,
    shader_version: ShaderVersion,
) -> Result<glow::Shader> {
    unsafe {
        let shader = gl.create_shader(kind).map_err(|e| anyhow!("Failed to create shader: {e}"))?;
        gl.shader_source(shader, &format!("{}\n{}", shader_version.version_declaration(), source));
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            error!(kind = kind, log = %log, "Shader compilation failed");
            bail!("Shader compilation failed: {log}");
        }
        Ok(shader)
    }
}

unsafe fn link_program(gl: &glow::Context, shader_version: ShaderVersion) -> Result<glow::Program> {
    unsafe {
        let program = gl.create_program().map_err(|e| anyhow!("Failed to create program: {e}"))?;

        let vertex = compile_shader(gl, glow::VERTEX_SHADER, VERTEX_SHADER, shader_version)
            .context("Failed to build vertex shader")?;
        let fragment = match compile_shader(gl, glow::FRAGMENT_SHADER, FRAGMENT_SHADER, shader_version) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex);
                gl.delete_program(program);
                return Err(e.context("Failed to build fragment shader"));
            }
        };

        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.bind_attrib_location(program, ATTR_POSITION, "aPos");
        gl.bind_attrib_location(program, ATTR_TEXCOORD, "aTexCoord");
        gl.link_program(program);

        for shader in [vertex, fragment] {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Shader program linking failed: {log}");
        }
        Ok(program)
    }
}
