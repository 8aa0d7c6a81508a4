//! Pattern engine backends: a WebGL2 fragment shader, with a CPU raster into
//! a 2D canvas when WebGL2 is unavailable.

use js_sys::Float32Array;
use log::{error, info};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, ImageData, WebGl2RenderingContext as GL,
    WebGlProgram, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::VizError;
use crate::pattern::{rasterize, PatternParameters};

const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

// Same algorithm and constants as `pattern::shade`, evaluated in f32.
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform vec2 iResolution;
uniform float pixelation;
uniform vec3 color1;
uniform vec3 color2;
uniform float scale;
uniform float speed;
uniform float TIME;

out vec4 fragColor;

float hash1(float n) { return fract(sin(n) * 43758.5453); }

vec2 hash2(vec2 p) {
    p = vec2(dot(p, vec2(127.1, 311.7)), dot(p, vec2(269.5, 183.3)));
    return fract(sin(p) * 43758.5453);
}

vec3 cellColor(vec2 x) {
    vec2 n = floor(x);
    vec2 f = x - n;
    float best = 8.0;
    vec2 cell = n;
    for (int j = -2; j <= 2; j++) {
        for (int i = -2; i <= 2; i++) {
            vec2 g = vec2(float(i), float(j));
            vec2 o = hash2(n + g);
            o = 0.5 + 0.5 * sin(TIME * speed + 6.2831 * o);
            float d = length(g - f + o);
            if (d < best) {
                best = d;
                cell = n + g;
            }
        }
    }
    float blend = hash1(dot(cell, vec2(7.0, 113.0))) * 0.5 + 0.5;
    vec3 col = mix(color1, color2, blend);
    return col * col;
}

void main() {
    vec2 p = gl_FragCoord.xy / iResolution.y;
    p *= scale;
    float cells = iResolution.y / pixelation;
    p = floor(p * cells) / cells;
    fragColor = vec4(sqrt(cellColor(6.0 * p)), 1.0);
}
"#;

/// Two triangles covering clip space.
const QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

struct Locations {
    resolution: Option<WebGlUniformLocation>,
    pixelation: Option<WebGlUniformLocation>,
    color1: Option<WebGlUniformLocation>,
    color2: Option<WebGlUniformLocation>,
    scale: Option<WebGlUniformLocation>,
    speed: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
}

pub struct GlPattern {
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    loc: Locations,
}

impl GlPattern {
    pub fn new(gl: GL) -> Result<Self, VizError> {
        let vs = compile(&gl, GL::VERTEX_SHADER, "vertex", VERTEX_SHADER)?;
        let fs = compile(&gl, GL::FRAGMENT_SHADER, "fragment", FRAGMENT_SHADER)?;
        let program = link(&gl, &vs, &fs)?;
        gl.use_program(Some(&program));

        let vao = gl
            .create_vertex_array()
            .ok_or(VizError::Context("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let buffer = gl.create_buffer().ok_or(VizError::Context("buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let vertices = Float32Array::from(&QUAD[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

        let position = gl.get_attrib_location(&program, "a_position");
        if position < 0 {
            return Err(VizError::Link("a_position attribute missing".into()));
        }
        gl.enable_vertex_attrib_array(position as u32);
        gl.vertex_attrib_pointer_with_i32(position as u32, 2, GL::FLOAT, false, 0, 0);

        let uniform = |name: &str| gl.get_uniform_location(&program, name);
        let loc = Locations {
            resolution: uniform("iResolution"),
            pixelation: uniform("pixelation"),
            color1: uniform("color1"),
            color2: uniform("color2"),
            scale: uniform("scale"),
            speed: uniform("speed"),
            time: uniform("TIME"),
        };
        Ok(Self {
            gl,
            program,
            vao,
            loc,
        })
    }

    pub fn draw(&self, params: &PatternParameters) {
        let gl = &self.gl;
        let u = params.uniforms();
        gl.viewport(0, 0, u.resolution[0] as i32, u.resolution[1] as i32);
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.uniform2f(self.loc.resolution.as_ref(), u.resolution[0], u.resolution[1]);
        gl.uniform1f(self.loc.pixelation.as_ref(), u.pixelation);
        gl.uniform3f(self.loc.color1.as_ref(), u.color1[0], u.color1[1], u.color1[2]);
        gl.uniform3f(self.loc.color2.as_ref(), u.color2[0], u.color2[1], u.color2[2]);
        gl.uniform1f(self.loc.scale.as_ref(), u.scale);
        gl.uniform1f(self.loc.speed.as_ref(), u.speed);
        gl.uniform1f(self.loc.time.as_ref(), u.time);
        gl.draw_arrays(GL::TRIANGLES, 0, 6);
    }
}

fn compile(gl: &GL, kind: u32, stage: &'static str, src: &str) -> Result<WebGlShader, VizError> {
    let shader = gl
        .create_shader(kind)
        .ok_or(VizError::Context("shader"))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(VizError::Shader { stage, log })
    }
}

fn link(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, VizError> {
    let program = gl
        .create_program()
        .ok_or(VizError::Context("program"))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(VizError::Link(log))
    }
}

/// CPU raster of the same field into a 2D canvas.
pub struct CpuPattern {
    ctx: CanvasRenderingContext2d,
    buf: Vec<u8>,
}

impl CpuPattern {
    pub fn draw(&mut self, params: &PatternParameters) -> Result<(), VizError> {
        let (w, h) = params.resolution;
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.buf.resize(w as usize * h as usize * 4, 0);
        rasterize(params, &mut self.buf)?;
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&self.buf[..]), w, h)
            .map_err(|e| VizError::Dom(format!("ImageData: {e:?}")))?;
        self.ctx
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|e| VizError::Dom(format!("putImageData: {e:?}")))
    }
}

pub enum PatternRenderer {
    Gpu(GlPattern),
    Cpu(CpuPattern),
}

impl PatternRenderer {
    /// WebGL2 when available. A shader failure disables the pattern; a
    /// missing WebGL2 context falls back to the CPU raster.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, VizError> {
        if let Some(gl) = context::<GL>(canvas, "webgl2") {
            let program = GlPattern::new(gl)?;
            info!("pattern engine: WebGL2");
            return Ok(Self::Gpu(program));
        }
        let ctx = context::<CanvasRenderingContext2d>(canvas, "2d")
            .ok_or(VizError::Context("webgl2 or 2d"))?;
        info!("pattern engine: CPU fallback");
        Ok(Self::Cpu(CpuPattern {
            ctx,
            buf: Vec::new(),
        }))
    }

    pub fn draw(&mut self, params: &PatternParameters) {
        match self {
            Self::Gpu(gl) => gl.draw(params),
            Self::Cpu(cpu) => {
                if let Err(e) = cpu.draw(params) {
                    error!("pattern raster failed: {e}");
                }
            }
        }
    }
}

fn context<T: JsCast>(canvas: &HtmlCanvasElement, kind: &str) -> Option<T> {
    canvas
        .get_context(kind)
        .map_err(|e: JsValue| error!("getContext({kind}) threw: {e:?}"))
        .ok()
        .flatten()?
        .dyn_into::<T>()
        .ok()
}
