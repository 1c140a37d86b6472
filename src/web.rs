//! WASM entry point - WebGL backend and the spinning point-cloud frame loop

use crate::error::{Error, Result};
use crate::math::Spin;
use crate::render::{
    BufferHandle, BufferTarget, BufferUsage, Camera, DrawBackend, DrawMode, Drawable, ElementType, GraphicsBackend,
    PointCloudScene, SceneConfig, SceneGeometry, TypedView,
};
use crate::Mat4;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation};

const VERTEX_SHADER: &str = r#"
    attribute vec3 position;
    attribute vec4 color;
    uniform mat4 modelViewProjection;
    uniform float pointSize;
    varying vec4 vColor;
    void main() {
        gl_Position = modelViewProjection * vec4(position, 1.0);
        gl_PointSize = pointSize;
        vColor = color;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    varying vec4 vColor;
    void main() {
        gl_FragColor = vColor;
    }
"#;

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::ShaderCompilationFailed("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(Error::ShaderCompilationFailed(
            gl.get_shader_info_log(&shader).unwrap_or_default(),
        ))
    }
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| Error::ShaderCompilationFailed("unable to create program object".into()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(Error::ShaderCompilationFailed(
            gl.get_program_info_log(&program).unwrap_or_default(),
        ))
    }
}

fn attrib_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32> {
    u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| Error::ShaderCompilationFailed(format!("attribute `{name}` not found")))
}

fn gl_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => Gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => Gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn gl_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => Gl::STATIC_DRAW,
        BufferUsage::DynamicDraw => Gl::DYNAMIC_DRAW,
    }
}

fn gl_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Points => Gl::POINTS,
        DrawMode::Lines => Gl::LINES,
        DrawMode::Triangles => Gl::TRIANGLES,
    }
}

/// Copies the view into a fresh JS buffer and wraps it in the matching typed array.
fn js_typed_array(view: &TypedView) -> js_sys::Object {
    let bytes = js_sys::Uint8Array::from(view.as_bytes());
    let buffer = bytes.buffer();
    match view.element_type() {
        ElementType::F32 => js_sys::Float32Array::new(&buffer).into(),
        ElementType::U16 => js_sys::Uint16Array::new(&buffer).into(),
        ElementType::U32 => js_sys::Uint32Array::new(&buffer).into(),
    }
}

pub struct WebGlBackend {
    gl: Gl,
    buffers: Vec<WebGlBuffer>,
    position_loc: u32,
    color_loc: u32,
    mvp_loc: Option<WebGlUniformLocation>,
}

impl WebGlBackend {
    pub fn new(gl: Gl, config: &SceneConfig) -> Result<Self> {
        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;
        gl.use_program(Some(&program));

        let position_loc = attrib_location(&gl, &program, "position")?;
        let color_loc = attrib_location(&gl, &program, "color")?;
        let mvp_loc = gl.get_uniform_location(&program, "modelViewProjection");
        let point_size_loc = gl.get_uniform_location(&program, "pointSize");

        gl.enable_vertex_attrib_array(position_loc);
        gl.enable_vertex_attrib_array(color_loc);
        gl.uniform1f(point_size_loc.as_ref(), config.point_size);

        let [r, g, b, a] = config.clear_color;
        gl.enable(Gl::DEPTH_TEST);
        gl.clear_color(r, g, b, a);

        Ok(Self {
            gl,
            buffers: Vec::new(),
            position_loc,
            color_loc,
            mvp_loc,
        })
    }

    pub fn clear(&self) {
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    pub fn viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    fn buffer(&self, handle: BufferHandle) -> Result<&WebGlBuffer> {
        self.buffers.get(handle.0 as usize).ok_or(Error::UnknownHandle(handle))
    }
}

impl GraphicsBackend for WebGlBackend {
    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| Error::BufferCreationFailed("createBuffer returned null".into()))?;
        let id = u32::try_from(self.buffers.len())
            .map_err(|_| Error::BufferCreationFailed("handle space exhausted".into()))?;
        self.buffers.push(buffer);
        Ok(BufferHandle(id))
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Result<()> {
        let buffer = self.buffer(handle)?;
        self.gl.bind_buffer(gl_target(target), Some(buffer));
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, view: &TypedView, usage: BufferUsage) -> Result<()> {
        let array = js_typed_array(view);
        self.gl
            .buffer_data_with_array_buffer_view(gl_target(target), &array, gl_usage(usage));
        Ok(())
    }
}

impl DrawBackend for WebGlBackend {
    fn set_mvp(&mut self, mvp: &Mat4) -> Result<()> {
        // column-major already, so no transpose
        self.gl
            .uniform_matrix4fv_with_f32_array(self.mvp_loc.as_ref(), false, mvp.as_slice());
        Ok(())
    }

    fn draw(&mut self, drawable: &Drawable) -> Result<()> {
        let positions = self.buffer(drawable.positions)?;
        let colors = self.buffer(drawable.colors)?;
        let vertex_count = i32::try_from(drawable.vertex_count)
            .map_err(|_| Error::InvalidArgument(format!("{} vertices exceed a draw call", drawable.vertex_count)))?;

        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(positions));
        self.gl
            .vertex_attrib_pointer_with_i32(self.position_loc, 3, Gl::FLOAT, false, 0, 0);

        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(colors));
        self.gl.vertex_attrib_pointer_with_i32(
            self.color_loc,
            drawable.color_components as i32,
            Gl::FLOAT,
            false,
            0,
            0,
        );

        self.gl.draw_arrays(gl_mode(drawable.mode), 0, vertex_count);
        Ok(())
    }
}

struct WebApp {
    canvas: HtmlCanvasElement,
    backend: WebGlBackend,
    scene: PointCloudScene,
    camera: Camera,
    spin: Spin,
    size: u32,
}

impl WebApp {
    fn new(config: SceneConfig) -> Result<Self> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| Error::ContextUnavailable("canvas element with id 'canvas' not found".into()))?;

        let gl = canvas
            .get_context("webgl")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<Gl>().ok())
            .ok_or_else(|| Error::ContextUnavailable("WebGL not supported".into()))?;

        let mut backend = WebGlBackend::new(gl, &config)?;
        let geometry = SceneGeometry::generate(&config, &mut rand::thread_rng());
        let scene = PointCloudScene::upload(&mut backend, &geometry, BufferUsage::StaticDraw)?;

        Ok(Self {
            canvas,
            backend,
            scene,
            camera: Camera::default(),
            spin: Spin::new(config.spin_step),
            size: 0,
        })
    }

    /// Keeps the canvas square, sized to the smaller window dimension.
    fn fit_to_window(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let size = width.min(height).max(1.0) as u32;
        if size == self.size {
            return;
        }

        self.size = size;
        self.canvas.set_width(size);
        self.canvas.set_height(size);
        self.backend.viewport(size as i32, size as i32);
        self.camera.resize(size, size);
        log::debug!("canvas resized to {size}x{size}");
    }

    fn frame(&mut self) -> Result<()> {
        self.fit_to_window();
        self.spin.advance();

        let frame = self.camera.frame(self.spin.model_matrix());
        self.backend.clear();
        self.scene.render(&mut self.backend, &frame)
    }
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {e:?}");
    }
}

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let app = WebApp::new(SceneConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let app = Rc::new(RefCell::new(app));
    log::info!("point cloud ready, starting frame loop");

    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();
    *callback.borrow_mut() = Some(Closure::new(move || {
        if let Err(e) = app.borrow_mut().frame() {
            log::warn!("frame failed: {e}");
        }
        if let Some(cb) = next.borrow().as_ref() {
            request_animation_frame(cb);
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        request_animation_frame(cb);
    }
    Ok(())
}
