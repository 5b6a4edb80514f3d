//!
//! OpenGL video driver.

use std::ffi::CString;

use sdl2::{
    video::{FullscreenType, GLContext, GLProfile, SwapInterval, Window},
    Sdl, VideoSubsystem,
};
use tracing::{debug, warn};

use crate::driver::{DriverError, DriverResult};
use crate::graphics::pipeline::{FrameRef, FramePipeline, RenderBackend, TextureFilter};
use crate::graphics::timing::SystemClock;
use crate::graphics::viewport::Viewport;
use crate::graphics::{PixelFormat, VideoInfo, VideoInit};
use crate::input::sdl::SdlInput;
use crate::input::InputDriver;

/// Registry identifier.
pub const IDENT: &str = "gl";

#[derive(Copy, Clone)]
#[repr(C)]
struct Vertex {
    pos: [f32; 2],
    tex: [f32; 2],
}

// Frames arrive top row first, so the top of the quad samples v = 0.
const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        pos: [-1.0, -1.0],
        tex: [0.0, 1.0],
    },
    Vertex {
        pos: [1.0, -1.0],
        tex: [1.0, 1.0],
    },
    Vertex {
        pos: [-1.0, 1.0],
        tex: [0.0, 0.0],
    },
    Vertex {
        pos: [1.0, 1.0],
        tex: [1.0, 0.0],
    },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

const VERT_SHADER_SRC: &str = r#"#version 110
attribute vec2 a_pos;
attribute vec2 a_tex;
varying vec2 v_tex;
void main() {
    v_tex = a_tex;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

const FRAG_SHADER_SRC: &str = r#"#version 110
varying vec2 v_tex;
uniform sampler2D u_tex;
void main() {
    gl_FragColor = texture2D(u_tex, v_tex);
}
"#;

/// Texture upload parameters for a pixel layout: internal format, format, type.
fn gl_pixel_format(format: PixelFormat) -> (u32, u32, u32) {
    match format {
        PixelFormat::Xrgb1555 => (gl::RGBA, gl::BGRA, gl::UNSIGNED_SHORT_1_5_5_5_REV),
        PixelFormat::Rgb565 => (gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
        PixelFormat::Xrgb8888 => (gl::RGBA, gl::BGRA, gl::UNSIGNED_INT_8_8_8_8_REV),
    }
}

fn gl_filter(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => gl::NEAREST,
        TextureFilter::Linear => gl::LINEAR,
    }
}

/// SDL2 window plus OpenGL objects: one texture, one quad, one program.
pub struct GlBackend {
    video_subsystem: VideoSubsystem,
    window: Option<Window>,
    gl_context: Option<GLContext>,
    texture: u32,
    vertex_buffer: u32,
    index_buffer: u32,
    shader_program: u32,
    filter: TextureFilter,
    format: PixelFormat,
    tex_width: u32,
    tex_height: u32,
}

impl std::fmt::Debug for GlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlBackend")
            .field("texture", &self.texture)
            .field("filter", &self.filter)
            .field("format", &self.format)
            .field("tex_size", &(self.tex_width, self.tex_height))
            .finish_non_exhaustive()
    }
}

impl GlBackend {
    /// Open the window, create the context and the GL objects.
    pub fn new(sdl: &Sdl, info: &VideoInfo) -> DriverResult<Self> {
        let video_subsystem = sdl
            .video()
            .map_err(|e| DriverError::backend(IDENT, format!("video subsystem: {}", e)))?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Compatibility);
        gl_attr.set_context_version(2, 1);
        gl_attr.set_depth_size(0);
        gl_attr.set_double_buffer(true);

        let mut window = video_subsystem
            .window(&info.title, info.width, info.height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| DriverError::backend(IDENT, format!("window: {}", e)))?;

        if info.fullscreen {
            window
                .set_fullscreen(FullscreenType::Desktop)
                .map_err(|e| DriverError::backend(IDENT, format!("set fullscreen: {}", e)))?;
        }

        let gl_context = window
            .gl_create_context()
            .map_err(|e| DriverError::backend(IDENT, format!("GL context: {}", e)))?;
        window
            .gl_make_current(&gl_context)
            .map_err(|e| DriverError::backend(IDENT, format!("make current: {}", e)))?;

        gl::load_with(|s| video_subsystem.gl_get_proc_address(s) as *const _);

        unsafe {
            gl::Disable(gl::DEPTH_TEST);
            gl::Disable(gl::DITHER);
            gl::Disable(gl::BLEND);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::ClearColor(0.0, 0.0, 0.0, 1.0);
        }

        let mut backend = Self {
            video_subsystem,
            window: Some(window),
            gl_context: Some(gl_context),
            texture: 0,
            vertex_buffer: 0,
            index_buffer: 0,
            shader_program: 0,
            filter: TextureFilter::from_smooth(info.smooth),
            format: info.pixel_format,
            tex_width: 0,
            tex_height: 0,
        };

        if let Err(err) = backend.init_gl_objects() {
            backend.destroy();
            return Err(err);
        }

        debug!(
            width = info.width,
            height = info.height,
            fullscreen = info.fullscreen,
            format = info.pixel_format.name(),
            "opened GL window"
        );
        Ok(backend)
    }

    fn init_gl_objects(&mut self) -> DriverResult<()> {
        self.init_texture();
        self.init_shaders()?;
        self.init_buffers();
        Ok(())
    }

    fn init_texture(&mut self) {
        let filter = gl_filter(self.filter);
        unsafe {
            gl::GenTextures(1, &mut self.texture);
            gl::BindTexture(gl::TEXTURE_2D, self.texture);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter as i32);
        }
    }

    fn init_shaders(&mut self) -> DriverResult<()> {
        let vertex_shader = compile_shader(gl::VERTEX_SHADER, VERT_SHADER_SRC)?;
        let fragment_shader = match compile_shader(gl::FRAGMENT_SHADER, FRAG_SHADER_SRC) {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { gl::DeleteShader(vertex_shader) };
                return Err(err);
            }
        };
        let program = unsafe { gl::CreateProgram() };

        unsafe {
            gl::AttachShader(program, vertex_shader);
            gl::AttachShader(program, fragment_shader);
            gl::BindAttribLocation(program, 0, b"a_pos\0".as_ptr().cast());
            gl::BindAttribLocation(program, 1, b"a_tex\0".as_ptr().cast());
            gl::LinkProgram(program);
        }

        let mut link_status = 0;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut link_status);
        }
        if link_status == 0 {
            let log = program_info_log(program);
            unsafe {
                gl::DeleteProgram(program);
                gl::DeleteShader(vertex_shader);
                gl::DeleteShader(fragment_shader);
            }
            return Err(DriverError::backend(IDENT, format!("shader link failed: {}", log)));
        }

        unsafe {
            gl::DetachShader(program, vertex_shader);
            gl::DetachShader(program, fragment_shader);
            gl::DeleteShader(vertex_shader);
            gl::DeleteShader(fragment_shader);
            gl::UseProgram(program);
            let sampler_location = gl::GetUniformLocation(program, b"u_tex\0".as_ptr().cast());
            if sampler_location >= 0 {
                gl::Uniform1i(sampler_location, 0);
            }
        }

        self.shader_program = program;
        Ok(())
    }

    fn init_buffers(&mut self) {
        unsafe {
            gl::GenBuffers(1, &mut self.vertex_buffer);
            gl::GenBuffers(1, &mut self.index_buffer);

            gl::BindBuffer(gl::ARRAY_BUFFER, self.vertex_buffer);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(&QUAD_VERTICES) as isize,
                QUAD_VERTICES.as_ptr().cast(),
                gl::STATIC_DRAW,
            );

            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.index_buffer);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                std::mem::size_of_val(&QUAD_INDICES) as isize,
                QUAD_INDICES.as_ptr().cast(),
                gl::STATIC_DRAW,
            );
        }
    }

    fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

fn compile_shader(shader_type: u32, source: &str) -> DriverResult<u32> {
    let c_str = CString::new(source)
        .map_err(|e| DriverError::backend(IDENT, format!("shader source contains null: {}", e)))?;
    let shader = unsafe { gl::CreateShader(shader_type) };

    unsafe {
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), std::ptr::null());
        gl::CompileShader(shader);
    }

    let mut status = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
    }
    if status == 0 {
        let log = shader_info_log(shader);
        unsafe {
            gl::DeleteShader(shader);
        }
        return Err(DriverError::backend(IDENT, format!("shader compile failed: {}", log)));
    }

    Ok(shader)
}

fn shader_info_log(shader: u32) -> String {
    let mut len = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
    }
    if len <= 1 {
        return String::new();
    }

    let mut buffer = vec![0u8; len as usize];
    unsafe {
        gl::GetShaderInfoLog(shader, len, std::ptr::null_mut(), buffer.as_mut_ptr().cast());
    }
    String::from_utf8_lossy(&buffer)
        .trim_end_matches('\0')
        .to_string()
}

fn program_info_log(program: u32) -> String {
    let mut len = 0;
    unsafe {
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    }
    if len <= 1 {
        return String::new();
    }

    let mut buffer = vec![0u8; len as usize];
    unsafe {
        gl::GetProgramInfoLog(program, len, std::ptr::null_mut(), buffer.as_mut_ptr().cast());
    }
    String::from_utf8_lossy(&buffer)
        .trim_end_matches('\0')
        .to_string()
}

impl RenderBackend for GlBackend {
    fn ident(&self) -> &'static str {
        IDENT
    }

    fn surface_size(&self) -> (u32, u32) {
        self.window().map_or((0, 0), Window::size)
    }

    fn texture_id(&self) -> Option<u32> {
        (self.texture != 0).then_some(self.texture)
    }

    fn set_swap_interval(&mut self, interval: u32) {
        let interval = if interval == 0 {
            SwapInterval::Immediate
        } else {
            SwapInterval::VSync
        };
        if let Err(e) = self.video_subsystem.gl_set_swap_interval(interval) {
            warn!(error = %e, "failed to set swap interval");
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        unsafe {
            gl::Viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        }
    }

    fn clear(&mut self) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// The texture is sized to the frame, so a new frame size reallocates it.
    fn set_video_size(&mut self, width: u32, height: u32) {
        if (width, height) == (self.tex_width, self.tex_height) {
            return;
        }

        let (internal, format, ty) = gl_pixel_format(self.format);
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.texture);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                internal as i32,
                width as i32,
                height as i32,
                0,
                format,
                ty,
                std::ptr::null(),
            );
        }
        debug!(width, height, "reallocated frame texture");
        self.tex_width = width;
        self.tex_height = height;
    }

    fn upload(&mut self, frame: &FrameRef<'_>) -> DriverResult<()> {
        if self.texture == 0 {
            return Err(DriverError::backend(IDENT, "texture not allocated"));
        }

        let extent = |v: usize| {
            i32::try_from(v).map_err(|_| DriverError::InvalidFrame(format!("{} exceeds GLint", v)))
        };
        let row_length = extent(frame.row_length())?;
        let width = extent(frame.width as usize)?;
        let height = extent(frame.height as usize)?;

        let (_, format, ty) = gl_pixel_format(frame.format);
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, self.texture);
            gl::PixelStorei(gl::UNPACK_ROW_LENGTH, row_length);
            gl::TexSubImage2D(
                gl::TEXTURE_2D,
                0,
                0,
                0,
                width,
                height,
                format,
                ty,
                frame.data.as_ptr().cast(),
            );
            gl::PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
        }
        Ok(())
    }

    fn draw(&mut self) {
        unsafe {
            gl::UseProgram(self.shader_program);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.vertex_buffer);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.index_buffer);
            gl::EnableVertexAttribArray(0);
            gl::VertexAttribPointer(
                0,
                2,
                gl::FLOAT,
                gl::FALSE,
                std::mem::size_of::<Vertex>() as i32,
                std::ptr::null(),
            );
            gl::EnableVertexAttribArray(1);
            gl::VertexAttribPointer(
                1,
                2,
                gl::FLOAT,
                gl::FALSE,
                std::mem::size_of::<Vertex>() as i32,
                (std::mem::size_of::<f32>() * 2) as *const _,
            );
            gl::DrawElements(
                gl::TRIANGLES,
                QUAD_INDICES.len() as i32,
                gl::UNSIGNED_SHORT,
                std::ptr::null(),
            );
            gl::DisableVertexAttribArray(0);
            gl::DisableVertexAttribArray(1);
        }
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = self.window.as_mut() {
            if let Err(e) = window.set_title(title) {
                warn!(error = %e, "failed to set window title");
            }
        }
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = self.window() {
            window.gl_swap_window();
        }
    }

    fn destroy(&mut self) {
        if self.gl_context.is_some() {
            unsafe {
                if self.texture != 0 {
                    gl::DeleteTextures(1, &self.texture);
                }
                if self.vertex_buffer != 0 {
                    gl::DeleteBuffers(1, &self.vertex_buffer);
                }
                if self.index_buffer != 0 {
                    gl::DeleteBuffers(1, &self.index_buffer);
                }
                if self.shader_program != 0 {
                    gl::DeleteProgram(self.shader_program);
                }
            }
        }

        self.texture = 0;
        self.vertex_buffer = 0;
        self.index_buffer = 0;
        self.shader_program = 0;
        self.tex_width = 0;
        self.tex_height = 0;

        self.gl_context = None;
        self.window = None;
    }
}

/// The `gl` video driver.
pub type GlVideo = FramePipeline<GlBackend, SystemClock>;

/// Registry init operation.
///
/// Brings the SDL input driver bound to the same context along. An input
/// failure is not fatal to video: the frontend falls back to the input
/// registry.
pub fn init(info: &VideoInfo) -> DriverResult<VideoInit> {
    let sdl = super::init_context(IDENT)?;
    let backend = GlBackend::new(&sdl, info)?;

    let input = match SdlInput::from_context(&sdl) {
        Ok(input) => Some(Box::new(input) as Box<dyn InputDriver>),
        Err(err) => {
            warn!(error = %err, "GL driver could not bind SDL input");
            None
        }
    };

    Ok(VideoInit {
        video: Box::new(GlVideo::new(backend, SystemClock::new(), info)),
        input,
    })
}
