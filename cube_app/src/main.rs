//! Cube demo application
//!
//! Exercises the engine end to end against the recording device: a pair of
//! lit cubes sharing one shader, an unlit wireframe cube, ambient and
//! directional lighting and a HUD clock, rendered headless on a fixed
//! frame schedule.

use std::rc::Rc;

use prism_engine::foundation::math::{constants, Vec2, Vec3, Vec4};
use prism_engine::prelude::*;
use prism_engine::render::backends::recording::RecordingDevice;
use prism_engine::scene::text::{FontAtlas, Glyph};

/// Frames rendered before the demo exits
const DEMO_FRAMES: u64 = 600;
/// Fixed frametime driving the schedule, in milliseconds
const FIXED_FRAMETIME: f32 = 1000.0 / 60.0;

const CONFIG_PATH: &str = "renderer.toml";

fn cube_geometry() -> GeometryData {
    // Unit cube, four vertices per face so normals stay flat.
    let face = |normal: Vec3, corners: [Vec3; 4]| (normal, corners);
    let h = 0.5;
    let faces = [
        face(Vec3::new(0.0, 0.0, 1.0), [
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ]),
        face(Vec3::new(0.0, 0.0, -1.0), [
            Vec3::new(h, -h, -h),
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
        ]),
        face(Vec3::new(1.0, 0.0, 0.0), [
            Vec3::new(h, -h, h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
        ]),
        face(Vec3::new(-1.0, 0.0, 0.0), [
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, h, -h),
        ]),
        face(Vec3::new(0.0, 1.0, 0.0), [
            Vec3::new(-h, h, h),
            Vec3::new(h, h, h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ]),
        face(Vec3::new(0.0, -1.0, 0.0), [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, -h, h),
            Vec3::new(-h, -h, h),
        ]),
    ];

    let mut geometry = GeometryData::new();
    for (i, (normal, corners)) in faces.iter().enumerate() {
        let base = (i * 4) as u32;
        geometry.positions.extend(corners.iter().copied());
        geometry.normals.extend(std::iter::repeat(*normal).take(4));
        geometry.texcoords.extend([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        geometry
            .indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    geometry
}

/// Build a synthetic monospace digit atlas for the HUD clock.
///
/// Glyph metrics are uniform; the uv rectangles tile the charset left to
/// right across one texture row.
fn digit_atlas(device: &mut RecordingDevice) -> Result<Rc<FontAtlas>, Box<dyn std::error::Error>> {
    const CHARSET: &str = "0123456789:.";
    let cell = 16.0;
    let width = cell * CHARSET.chars().count() as f32;

    let texture = device.create_texture((width as u32, cell as u32))?;
    let mut atlas = FontAtlas::new(texture, Vec2::new(width, cell));

    for (i, character) in CHARSET.chars().enumerate() {
        let u0 = i as f32 * cell / width;
        let u1 = (i + 1) as f32 * cell / width;
        atlas.add_glyph(
            character,
            Glyph {
                offset: Vec2::new(1.0, 14.0),
                size: Vec2::new(14.0, 14.0),
                advance: cell,
                uv_min: Vec2::new(u0, 0.0),
                uv_max: Vec2::new(u1, 1.0),
            },
        );
    }
    Ok(Rc::new(atlas))
}

fn spinning_cube(
    device: &mut RecordingDevice,
    shader: prism_engine::render::ShaderHandle,
    position: Vec3,
    color: Vec4,
    freq: f32,
) -> Result<MeshNode, Box<dyn std::error::Error>> {
    let mut material = Material::with_shader(shader);
    material.set_color(color);

    let mut node = MeshNode::new(cube_geometry(), material);
    node.data_mut().transform_mut().translation = position;
    node.init(device)?;

    let mut rotation = Scaler::new();
    rotation.set_range(0.0, constants::TAU);
    rotation.set_freq(freq);
    node.set_logic(move |data, ctx| {
        rotation.inc_phase(ctx.frametime);
        let angle = rotation.cosine_eased();
        data.transform_mut().rotation = Vec3::new(angle * 0.5, angle, 0.0);
    });
    Ok(node)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = RendererConfig::load_from_file(CONFIG_PATH).unwrap_or_else(|err| {
        log::info!("no renderer config ({err}), using defaults");
        RendererConfig::default()
    });

    let mut device = RecordingDevice::new();
    let mut renderer = FrameRenderer::new(&config);
    renderer.init(&mut device)?;

    let mut camera = Camera::new();
    camera.set_pos(Vec3::new(0.0, 1.5, 5.0));
    camera.set_pitch(-15.0);
    camera.calc_front();
    camera.set_aspect_ratio(config.viewport.0 as f32 / config.viewport.1 as f32);

    let lit_shader = device.create_shader("lit")?;
    let unlit_shader = device.create_shader("unlit")?;
    let text_shader = device.create_shader("text")?;

    let mut scene = Scene::new();
    scene.add_light(Light::ambient(Vec4::new(1.0, 1.0, 1.0, 1.0), 0.4));
    scene.add_light(Light::directional(
        Vec3::new(-0.5, -1.0, -0.3),
        Vec4::new(1.0, 0.95, 0.9, 1.0),
        0.8,
    ));

    // Two lit cubes share the lit shader, so the traversal binds it once.
    scene.add(Box::new(spinning_cube(
        &mut device,
        lit_shader,
        Vec3::new(-1.2, 0.0, 0.0),
        Vec4::new(0.9, 0.3, 0.2, 1.0),
        0.25,
    )?));
    scene.add(Box::new(spinning_cube(
        &mut device,
        lit_shader,
        Vec3::new(1.2, 0.0, 0.0),
        Vec4::new(0.2, 0.5, 0.9, 1.0),
        0.4,
    )?));

    // Wireframe cube drawn behind the others, unlit.
    let mut wire_material = Material::with_shader(unlit_shader);
    wire_material.set_lit(false);
    wire_material.set_wireframe(true);
    wire_material.set_color(Vec4::new(0.4, 1.0, 0.4, 1.0));
    let mut wire_cube = MeshNode::new(cube_geometry(), wire_material);
    wire_cube.data_mut().transform_mut().translation = Vec3::new(0.0, 0.0, -3.0);
    wire_cube.data_mut().transform_mut().scale = Vec3::new(2.0, 2.0, 2.0);
    wire_cube.init(&mut device)?;
    scene.add(Box::new(wire_cube));

    // HUD clock locked to the camera orientation, in the upper left.
    let atlas = digit_atlas(&mut device)?;
    let mut hud_material = Material::with_shader(text_shader);
    hud_material.set_lit(false);
    let mut clock = TimeDisplay::new(atlas, hud_material);
    clock.init(&mut device)?;
    clock.data_mut().transform_mut().translation = Vec3::new(-0.55, 0.35, -1.0);
    clock.data_mut().set_camera_translated(false);
    clock.data_mut().set_depth_tested(false);
    scene.add(Box::new(clock));

    log::info!(
        "scene ready: {} nodes, {} lights, rendering {DEMO_FRAMES} frames",
        scene.len(),
        scene.lights().len()
    );

    let mut timer = FrameTimer::new();
    for _ in 0..DEMO_FRAMES {
        timer.begin_frame();

        renderer.render(&mut device, &mut scene, &camera);

        let frametime = timer.end_frame_fixed(FIXED_FRAMETIME);
        renderer.advance_time(frametime);
    }

    let draws = device.draw_calls();
    let activations = device.shader_activations();
    log::info!(
        "rendered {} frames in {:.1} ms of schedule time: {draws} draw calls, {activations} shader activations, {} device calls",
        timer.elapsed_frames(),
        timer.elapsed_time(),
        device.calls().len()
    );

    log::info!("demo complete");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}
