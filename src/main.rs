//! OpenR3D demo viewer
//!
//! Spins a mesh in front of the software rasterizer and blits the
//! framebuffer to a macroquad window. Pass a .obj or .ron model path as the
//! first argument; with no argument a cube is shown.

use macroquad::prelude::*;

use openr3d::geometry;
use openr3d::io::{load_model, load_obj};
use openr3d::rasterizer::{self, Framebuffer, Matrix3, Matrix4, Mesh};

/// Internal render resolution
const WIDTH: usize = 800;
const HEIGHT: usize = 600;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("OpenR3D v{}", openr3d::VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_scene() -> Mesh {
    match std::env::args().nth(1) {
        Some(path) => {
            let loaded = if path.ends_with(".obj") {
                load_obj(&path).map_err(|e| e.to_string())
            } else {
                load_model(&path).map_err(|e| e.to_string())
            };
            match loaded {
                Ok(mesh) => mesh,
                Err(e) => {
                    eprintln!("Failed to load {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => geometry::cube(200.0, rasterizer::Color::CYAN),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let mesh = load_scene();
    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut angle: f64 = 0.0;

    println!("=== OpenR3D ===");

    loop {
        angle += 0.01;

        // Rotate, then move to the middle of the framebuffer
        let rotation = Matrix3::rotation_y(angle).multiply(&Matrix3::rotation_x(angle * 0.5));
        let centering = Matrix4::translation(WIDTH as f64 / 2.0, HEIGHT as f64 / 2.0, 0.0);
        let frame = mesh.transformed(&rotation).transformed(&centering);

        fb.clear(rasterizer::Color::BLACK);
        if let Err(e) = rasterizer::render_mesh(&mut fb, &frame) {
            eprintln!("Render failed: {}", e);
            break;
        }

        clear_background(BLACK);

        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await
    }
}
