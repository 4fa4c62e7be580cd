//! WebGL2 side of the hero: owns every GL object and draws one frame of a
//! [`SceneState`]. The scene decides where things are; this only uploads and
//! draws them.

use glam::{Mat4, Vec2, Vec3};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer,
    WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::HeroError;
use crate::palette::Rgb;
use crate::scene::{Camera, SceneState};

const SHARD_VS: &str = r#"#version 300 es
layout(location = 0) in vec2 a_position;
layout(location = 1) in mat4 a_model;
layout(location = 5) in vec3 a_color;
uniform mat4 u_view_proj;
uniform mat4 u_scene;
out vec3 v_color;
void main() {
    v_color = a_color;
    gl_Position = u_view_proj * u_scene * a_model * vec4(a_position, 0.0, 1.0);
}
"#;

const SHARD_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
uniform float u_opacity;
out vec4 o_color;
void main() {
    o_color = vec4(v_color * u_opacity, u_opacity);
}
"#;

const SPRITE_VS: &str = r#"#version 300 es
layout(location = 0) in vec2 a_position;
uniform mat4 u_view_proj;
uniform mat4 u_model;
out vec2 v_uv;
void main() {
    v_uv = a_position + 0.5;
    gl_Position = u_view_proj * u_model * vec4(a_position, 0.0, 1.0);
}
"#;

// textures are uploaded premultiplied
const SPRITE_FS: &str = r#"#version 300 es
precision mediump float;
in vec2 v_uv;
uniform sampler2D u_texture;
uniform float u_opacity;
out vec4 o_color;
void main() {
    o_color = texture(u_texture, v_uv) * u_opacity;
}
"#;

const SHARD_OPACITY: f32 = 0.95;
const STREAK_TEXTURE_SIZE: (u32, u32) = (256, 896);
const SYMBOL_TEXTURE_SIZE: u32 = 256;
const GLYPH_ALPHA: f32 = 0.95;
const SYMBOL_FONT: &str = "700 80px system-ui, -apple-system, Segoe UI, Roboto, sans-serif";
/// Cap on device pixels per CSS pixel.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

const MAT4_BYTES: i32 = 64;
const RGB_BYTES: i32 = 12;

struct ShardPass {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    mesh: WebGlBuffer,
    instances: WebGlBuffer,
    colors: WebGlBuffer,
    u_view_proj: Option<WebGlUniformLocation>,
    u_scene: Option<WebGlUniformLocation>,
    u_opacity: Option<WebGlUniformLocation>,
}

struct SpritePass {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    quad: WebGlBuffer,
    u_view_proj: Option<WebGlUniformLocation>,
    u_model: Option<WebGlUniformLocation>,
    u_opacity: Option<WebGlUniformLocation>,
    u_texture: Option<WebGlUniformLocation>,
}

pub struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    document: Document,
    camera: Camera,
    pixel_ratio: f64,
    shards: ShardPass,
    sprites: SpritePass,
    shard_count: i32,
    /// Streak texture and the loop count it was painted for.
    streak_texture: Option<(u64, WebGlTexture)>,
    symbol_texture: Option<(char, WebGlTexture)>,
}

impl Renderer {
    /// Create a transparent WebGL2 context on `canvas` and every buffer the
    /// scene needs. Fails with `ContextUnavailable` when WebGL2 is missing.
    pub fn new(
        canvas: HtmlCanvasElement,
        document: Document,
        scene: &SceneState,
        size: (f64, f64),
        pixel_ratio: f64,
    ) -> Result<Self, HeroError> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::TRUE)?;
        js_sys::Reflect::set(&options, &"antialias".into(), &JsValue::TRUE)?;
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &options)
            .map_err(|_| HeroError::ContextUnavailable)?
            .ok_or(HeroError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| HeroError::ContextUnavailable)?;

        let shard_count = scene.shard_count() as i32;
        let shards = ShardPass::new(&gl, scene.shard_mesh(), shard_count)?;
        let sprites = SpritePass::new(&gl)?;

        let mut renderer = Self {
            gl,
            canvas,
            document,
            camera: Camera::new(size.0, size.1),
            pixel_ratio: pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO),
            shards,
            sprites,
            shard_count,
            streak_texture: None,
            symbol_texture: None,
        };
        renderer.resize(size.0, size.1);
        Ok(renderer)
    }

    /// Follow the container's CSS size. Nothing in the scene moves.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
        let px = |v: f64| ((v * self.pixel_ratio).round() as u32).max(1);
        self.canvas.set_width(px(width));
        self.canvas.set_height(px(height));
    }

    pub fn draw(&mut self, scene: &mut SceneState) -> Result<(), HeroError> {
        self.sync_textures(scene)?;
        self.upload(scene);

        let gl = &self.gl;
        gl.viewport(0, 0, self.canvas.width() as i32, self.canvas.height() as i32);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.disable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::ONE, GL::ONE);

        let view_proj = self.camera.view_projection().to_cols_array();
        let scene_rotation = scene.scene_rotation();

        // light streaks
        if let Some((_, texture)) = &self.streak_texture {
            self.sprites.begin(gl, &view_proj, texture);
            for streak in scene.streaks() {
                let world = scene_rotation.transform_point3(streak.position);
                let model = Mat4::from_translation(world)
                    * Mat4::from_rotation_z(streak.rotation)
                    * Mat4::from_scale(Vec3::new(streak.scale.x, streak.scale.y, 1.0));
                self.sprites.draw(gl, &model, streak.opacity);
            }
        }

        // shards
        gl.use_program(Some(&self.shards.program));
        gl.bind_vertex_array(Some(&self.shards.vao));
        gl.uniform_matrix4fv_with_f32_array(self.shards.u_view_proj.as_ref(), false, &view_proj);
        gl.uniform_matrix4fv_with_f32_array(self.shards.u_scene.as_ref(), false, &scene_rotation.to_cols_array());
        gl.uniform1f(self.shards.u_opacity.as_ref(), SHARD_OPACITY);
        gl.draw_arrays_instanced(GL::TRIANGLES, 0, 3, self.shard_count);

        // center glyph
        let symbol = scene.symbol();
        if symbol.opacity > 0.0 {
            if let Some((_, texture)) = &self.symbol_texture {
                self.sprites.begin(gl, &view_proj, texture);
                let model = Mat4::from_scale(Vec3::new(symbol.scale, symbol.scale, 1.0));
                self.sprites.draw(gl, &model, symbol.opacity);
            }
        }

        gl.bind_vertex_array(None);
        Ok(())
    }

    fn upload(&self, scene: &mut SceneState) {
        let gl = &self.gl;
        if scene.instances_dirty() {
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.shards.instances));
            gl.buffer_sub_data_with_i32_and_u8_array(GL::ARRAY_BUFFER, 0, bytemuck::cast_slice(scene.instances()));
        }
        if scene.colors_dirty() {
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.shards.colors));
            gl.buffer_sub_data_with_i32_and_u8_array(GL::ARRAY_BUFFER, 0, bytemuck::cast_slice(scene.colors()));
        }
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        scene.mark_uploaded();
    }

    /// Repaint the streak gradient after a palette change and the glyph after
    /// a symbol swap.
    fn sync_textures(&mut self, scene: &SceneState) -> Result<(), HeroError> {
        let cycle = scene.cycles();
        if self.streak_texture.as_ref().map(|(c, _)| *c) != Some(cycle) {
            let (a, b) = scene.streak_colors();
            let canvas = self.streak_canvas(a, b)?;
            let texture = canvas_texture(&self.gl, &canvas)?;
            if let Some((_, old)) = self.streak_texture.replace((cycle, texture)) {
                self.gl.delete_texture(Some(&old));
            }
        }

        let glyph = scene.symbol().glyph;
        if self.symbol_texture.as_ref().map(|(g, _)| *g) != Some(glyph) {
            let canvas = self.symbol_canvas(glyph)?;
            let texture = canvas_texture(&self.gl, &canvas)?;
            if let Some((_, old)) = self.symbol_texture.replace((glyph, texture)) {
                self.gl.delete_texture(Some(&old));
            }
        }
        Ok(())
    }

    fn scratch_canvas(&self, width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), HeroError> {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| HeroError::Resource("scratch canvas"))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .and_then(|ctx| ctx.dyn_into().ok())
            .ok_or(HeroError::Resource("2d context"))?;
        Ok((canvas, ctx))
    }

    /// Two soft bands along a vertical gradient, fading to transparent.
    fn streak_canvas(&self, a: Rgb, b: Rgb) -> Result<HtmlCanvasElement, HeroError> {
        let (w, h) = STREAK_TEXTURE_SIZE;
        let (canvas, ctx) = self.scratch_canvas(w, h)?;
        let (w, h) = (w as f64, h as f64);
        let gradient = ctx.create_linear_gradient(w / 2.0, 0.0, w / 2.0, h);
        let band = a.to_css(1.0);
        let clear = b.to_css(0.0);
        for (offset, color) in [
            (0.00, &clear),
            (0.18, &band),
            (0.33, &clear),
            (0.67, &clear),
            (0.82, &band),
            (1.00, &clear),
        ] {
            gradient.add_color_stop(offset, color)?;
        }
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.fill_rect(0.0, 0.0, w, h);
        Ok(canvas)
    }

    fn symbol_canvas(&self, glyph: char) -> Result<HtmlCanvasElement, HeroError> {
        let size = SYMBOL_TEXTURE_SIZE;
        let (canvas, ctx) = self.scratch_canvas(size, size)?;
        let half = size as f64 / 2.0;
        ctx.clear_rect(0.0, 0.0, size as f64, size as f64);
        ctx.set_fill_style_str(&Rgb::WHITE.to_css(GLYPH_ALPHA));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font(SYMBOL_FONT);
        ctx.fill_text(&glyph.to_string(), half, half)?;
        Ok(canvas)
    }

    /// Delete every GL object and drop the context. Safe to call twice.
    pub fn dispose(&mut self) {
        let gl = &self.gl;
        if let Some((_, t)) = self.streak_texture.take() {
            gl.delete_texture(Some(&t));
        }
        if let Some((_, t)) = self.symbol_texture.take() {
            gl.delete_texture(Some(&t));
        }
        for buffer in [&self.shards.mesh, &self.shards.instances, &self.shards.colors, &self.sprites.quad] {
            gl.delete_buffer(Some(buffer));
        }
        gl.delete_vertex_array(Some(&self.shards.vao));
        gl.delete_vertex_array(Some(&self.sprites.vao));
        gl.delete_program(Some(&self.shards.program));
        gl.delete_program(Some(&self.sprites.program));

        if let Ok(Some(ext)) = gl.get_extension("WEBGL_lose_context") {
            if let Ok(lose) = js_sys::Reflect::get(&ext, &"loseContext".into()) {
                if let Some(lose) = lose.dyn_ref::<js_sys::Function>() {
                    let _ = lose.call0(&ext);
                }
            }
        }
    }
}

impl ShardPass {
    fn new(gl: &GL, mesh: &[Vec2; 3], capacity: i32) -> Result<Self, HeroError> {
        let program = link_program(gl, SHARD_VS, SHARD_FS)?;
        let vao = gl.create_vertex_array().ok_or(HeroError::Resource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let mesh_buffer = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&mesh_buffer));
        gl.buffer_data_with_u8_array(GL::ARRAY_BUFFER, bytemuck::cast_slice(&mesh[..]), GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, 0, 0);

        // mat4 takes four consecutive vec4 slots
        let instances = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&instances));
        gl.buffer_data_with_i32(GL::ARRAY_BUFFER, capacity * MAT4_BYTES, GL::DYNAMIC_DRAW);
        for column in 0..4u32 {
            let loc = 1 + column;
            gl.enable_vertex_attrib_array(loc);
            gl.vertex_attrib_pointer_with_i32(loc, 4, GL::FLOAT, false, MAT4_BYTES, column as i32 * 16);
            gl.vertex_attrib_divisor(loc, 1);
        }

        let colors = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&colors));
        gl.buffer_data_with_i32(GL::ARRAY_BUFFER, capacity * RGB_BYTES, GL::DYNAMIC_DRAW);
        gl.enable_vertex_attrib_array(5);
        gl.vertex_attrib_pointer_with_i32(5, 3, GL::FLOAT, false, RGB_BYTES, 0);
        gl.vertex_attrib_divisor(5, 1);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(Self {
            u_view_proj: gl.get_uniform_location(&program, "u_view_proj"),
            u_scene: gl.get_uniform_location(&program, "u_scene"),
            u_opacity: gl.get_uniform_location(&program, "u_opacity"),
            program,
            vao,
            mesh: mesh_buffer,
            instances,
            colors,
        })
    }
}

impl SpritePass {
    fn new(gl: &GL) -> Result<Self, HeroError> {
        let program = link_program(gl, SPRITE_VS, SPRITE_FS)?;
        let vao = gl.create_vertex_array().ok_or(HeroError::Resource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let quad: [Vec2; 6] = [
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ];
        let buffer = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_u8_array(GL::ARRAY_BUFFER, bytemuck::cast_slice(&quad), GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, 0, 0);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(Self {
            u_view_proj: gl.get_uniform_location(&program, "u_view_proj"),
            u_model: gl.get_uniform_location(&program, "u_model"),
            u_opacity: gl.get_uniform_location(&program, "u_opacity"),
            u_texture: gl.get_uniform_location(&program, "u_texture"),
            program,
            vao,
            quad: buffer,
        })
    }

    fn begin(&self, gl: &GL, view_proj: &[f32; 16], texture: &WebGlTexture) {
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.uniform_matrix4fv_with_f32_array(self.u_view_proj.as_ref(), false, view_proj);
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(texture));
        gl.uniform1i(self.u_texture.as_ref(), 0);
    }

    fn draw(&self, gl: &GL, model: &Mat4, opacity: f32) {
        gl.uniform_matrix4fv_with_f32_array(self.u_model.as_ref(), false, &model.to_cols_array());
        gl.uniform1f(self.u_opacity.as_ref(), opacity);
        gl.draw_arrays(GL::TRIANGLES, 0, 6);
    }
}

fn create_buffer(gl: &GL) -> Result<WebGlBuffer, HeroError> {
    gl.create_buffer().ok_or(HeroError::Resource("buffer"))
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, HeroError> {
    let shader = gl.create_shader(kind).ok_or(HeroError::Resource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(HeroError::Shader(log))
    }
}

fn link_program(gl: &GL, vs: &str, fs: &str) -> Result<WebGlProgram, HeroError> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vs)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, fs)?;
    let program = gl.create_program().ok_or(HeroError::Resource("program"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(HeroError::Link(log))
    }
}

fn canvas_texture(gl: &GL, canvas: &HtmlCanvasElement) -> Result<WebGlTexture, HeroError> {
    let texture = gl.create_texture().ok_or(HeroError::Resource("texture"))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 1);
    gl.pixel_storei(GL::UNPACK_PREMULTIPLY_ALPHA_WEBGL, 1);
    gl.tex_image_2d_with_u32_and_u32_and_html_canvas_element(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        canvas,
    )?;
    gl.generate_mipmap(GL::TEXTURE_2D);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR_MIPMAP_LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    gl.bind_texture(GL::TEXTURE_2D, None);
    Ok(texture)
}
