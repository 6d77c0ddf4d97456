//! Rendering properties that need a live OpenGL context and a display.
//!
//! Ignored by default; run them on a machine with a GPU and a window system:
//! `cargo test -- --ignored --test-threads=1`

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use spritewell::gl;
use spritewell::prelude::*;
use std::ffi::CString;
use std::path::PathBuf;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

fn texture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets/textures")
        .join(file)
}

/// Brings up a hidden-window GL context, hands a fresh renderer to the test
/// closure, and tears everything down again.
fn with_renderer(test: impl FnOnce(&mut SpriteRenderer)) {
    struct Harness<F: FnOnce(&mut SpriteRenderer)> {
        test: Option<F>,
        state: Option<(PossiblyCurrentContext, Surface<WindowSurface>, Window)>,
    }

    impl<F: FnOnce(&mut SpriteRenderer)> ApplicationHandler for Harness<F> {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            let window_attributes = Window::default_attributes()
                .with_visible(false)
                .with_inner_size(winit::dpi::PhysicalSize::new(640, 480));
            let template = ConfigTemplateBuilder::new().with_alpha_size(8);
            let display_builder =
                DisplayBuilder::new().with_window_attributes(Some(window_attributes));

            let (window, gl_config) = display_builder
                .build(event_loop, template, |configs| {
                    configs
                        .reduce(|accum, config| {
                            if config.num_samples() < accum.num_samples() {
                                config
                            } else {
                                accum
                            }
                        })
                        .unwrap()
                })
                .unwrap();
            let window = window.unwrap();

            let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
            let gl_display = gl_config.display();
            let context_attributes = ContextAttributesBuilder::new()
                .with_profile(GlProfile::Core)
                .with_context_api(ContextApi::OpenGl(None))
                .build(raw_window_handle);

            let not_current_gl_context = unsafe {
                gl_display
                    .create_context(&gl_config, &context_attributes)
                    .expect("failed to create context")
            };

            let attrs = window
                .build_surface_attributes(Default::default())
                .expect("failed to build surface attributes");
            let gl_surface = unsafe {
                gl_display
                    .create_window_surface(&gl_config, &attrs)
                    .unwrap()
            };
            let gl_context = not_current_gl_context.make_current(&gl_surface).unwrap();

            gl::load_with(|symbol| {
                let symbol = CString::new(symbol).unwrap();
                gl_display.get_proc_address(symbol.as_c_str()).cast()
            });

            let mut renderer = SpriteRenderer::new().unwrap();
            (self.test.take().unwrap())(&mut renderer);

            self.state = Some((gl_context, gl_surface, window));
            event_loop.exit();
        }

        fn window_event(
            &mut self,
            _event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            _event: WindowEvent,
        ) {
        }
    }

    #[cfg(target_os = "linux")]
    let event_loop = {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoop::builder().with_any_thread(true).build().unwrap()
    };
    #[cfg(not(target_os = "linux"))]
    let event_loop = EventLoop::new().unwrap();

    let mut harness = Harness {
        test: Some(test),
        state: None,
    };
    event_loop.run_app(&mut harness).unwrap();
}

/// clears the sprite's render target to a solid color through the scoped
/// escape hatch
fn clear_sprite(renderer: &mut SpriteRenderer, sprite: &Sprite, color: Color) {
    renderer.begin_render_to_sprite(sprite);
    unsafe {
        gl::ClearColor(color.r, color.g, color.b, color.a);
        gl::Clear(gl::COLOR_BUFFER_BIT);
    }
    renderer.end_render_to_sprite();
}

fn assert_color_near(actual: Color, expected: Color, context: &str) {
    // One 8-bit quantization step of slack.
    let tolerance = 1.0 / 255.0 + f32::EPSILON;
    for (a, e) in [
        (actual.r, expected.r),
        (actual.g, expected.g),
        (actual.b, expected.b),
        (actual.a, expected.a),
    ] {
        assert!(
            (a - e).abs() <= tolerance,
            "{context}: got {actual:?}, expected {expected:?}"
        );
    }
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn scoped_render_round_trip() {
    with_renderer(|renderer| {
        let sprite = Sprite::empty(renderer, 16, 16, PixelFormat::Rgba);
        let color = Color::new(0.25, 0.5, 0.75, 1.0);
        clear_sprite(renderer, &sprite, color);

        assert_color_near(sprite.color_at(3, 9), color, "color_at(3, 9)");
        assert_color_near(sprite.color_at(0, 0), color, "color_at(0, 0)");
        assert_color_near(sprite.color_at(15, 15), color, "color_at(15, 15)");
        assert!((sprite.channel_at(8, 8, Channel::Green) - 0.5).abs() <= 1.0 / 255.0);
    });
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn mix_clamps_to_unit_interval() {
    with_renderer(|renderer| {
        let canvas = Sprite::empty(renderer, 8, 8, PixelFormat::Rgba);
        let medium = Sprite::from_png(renderer, texture_path("two_tone.png")).unwrap();

        // The medium covers the canvas exactly, so each render overwrites
        // the previous result.
        renderer.render_to_sprite(&canvas, &medium, 0.0);
        let at_zero = canvas.texels();
        renderer.render_to_sprite(&canvas, &medium, -1.0);
        let below_zero = canvas.texels();
        renderer.render_to_sprite(&canvas, &medium, 1.0);
        let at_one = canvas.texels();
        renderer.render_to_sprite(&canvas, &medium, 2.0);
        let above_one = canvas.texels();

        assert_eq!(at_zero, below_zero);
        assert_eq!(at_one, above_one);
        // The two boundaries differ: pure canvas source vs pure medium.
        assert_ne!(at_zero, at_one);
    });
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn palette_swap_splits_at_boundary() {
    with_renderer(|renderer| {
        let canvas = Sprite::empty(renderer, 8, 8, PixelFormat::Rgba);
        let mut medium = Sprite::from_png(renderer, texture_path("two_tone.png")).unwrap();

        let red = Color::opaque(1.0, 0.0, 0.0);
        let blue = Color::opaque(0.0, 0.0, 1.0);
        let white = Color::WHITE;
        let green = Color::opaque(0.0, 1.0, 0.0);

        // Above the boundary red turns white; below, blue turns green. The
        // red key in palette B proves the upper half never consults B.
        let mut palette_a = Palette::new();
        palette_a.push(red, white).unwrap();
        let mut palette_b = Palette::new();
        palette_b.push(red, Color::BLACK).unwrap();
        palette_b.push(blue, green).unwrap();

        medium.set_palette_a(Some(shared_ptr(palette_a)));
        medium.set_palette_b(Some(shared_ptr(palette_b)));
        medium.set_swap_height(4);

        renderer.render_to_sprite(&canvas, &medium, 1.0);

        // Readback rows count from the bottom: the image's red top half is
        // the target's upper rows.
        assert_color_near(canvas.color_at(4, 7), white, "top half");
        assert_color_near(canvas.color_at(4, 4), white, "row above boundary");
        assert_color_near(canvas.color_at(4, 3), green, "boundary row");
        assert_color_near(canvas.color_at(4, 0), green, "bottom half");
    });
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn lone_palette_applies_on_both_sides() {
    with_renderer(|renderer| {
        let canvas = Sprite::empty(renderer, 8, 8, PixelFormat::Rgba);
        let mut medium = Sprite::from_png(renderer, texture_path("two_tone.png")).unwrap();

        let mut palette = Palette::new();
        palette
            .push(Color::opaque(1.0, 0.0, 0.0), Color::WHITE)
            .unwrap();
        palette
            .push(Color::opaque(0.0, 0.0, 1.0), Color::WHITE)
            .unwrap();
        medium.set_palette_a(Some(shared_ptr(palette)));
        medium.set_swap_height(4);

        renderer.render_to_sprite(&canvas, &medium, 1.0);

        assert_color_near(canvas.color_at(4, 7), Color::WHITE, "upper half");
        assert_color_near(canvas.color_at(4, 0), Color::WHITE, "lower half");
    });
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn composited_region_matches_transform() {
    with_renderer(|renderer| {
        let canvas = Sprite::empty(renderer, 256, 256, PixelFormat::Rgba);
        let mut medium = Sprite::empty(renderer, 64, 64, PixelFormat::Rgba);
        clear_sprite(renderer, &canvas, Color::WHITE);

        medium.set_position(10, 10);
        medium.set_scale(2.0, 2.0);
        renderer.render_to_sprite(&canvas, &medium, 1.0);

        // Inside the 128x128 footprint: the medium's zero-initialized
        // content. Outside: the canvas target untouched.
        let zero = Color::TRANSPARENT;
        assert_color_near(canvas.color_at(10, 10), zero, "inside, lower-left corner");
        assert_color_near(canvas.color_at(137, 137), zero, "inside, upper-right corner");
        assert_color_near(canvas.color_at(70, 70), zero, "inside, center");
        assert_color_near(canvas.color_at(9, 10), Color::WHITE, "left of footprint");
        assert_color_near(canvas.color_at(10, 9), Color::WHITE, "below footprint");
        assert_color_near(canvas.color_at(138, 137), Color::WHITE, "right of footprint");
        assert_color_near(canvas.color_at(200, 200), Color::WHITE, "far outside");
    });
}

#[test]
#[ignore = "requires a live OpenGL context"]
fn animated_sheet_advances_through_frames() {
    with_renderer(|renderer| {
        let canvas = Sprite::empty(renderer, 8, 8, PixelFormat::Rgba);
        let mut medium =
            Sprite::animated_from_png(renderer, texture_path("sheet.png"), 8, 8).unwrap();

        let green = Color::opaque(0.0, 1.0, 0.0);
        let yellow = Color::opaque(1.0, 1.0, 0.0);

        renderer.render_to_sprite(&canvas, &medium, 1.0);
        assert_color_near(canvas.color_at(4, 4), green, "first frame");

        medium.advance_frame();
        assert_eq!(medium.frame().offset(), (8, 0));
        renderer.render_to_sprite(&canvas, &medium, 1.0);
        assert_color_near(canvas.color_at(4, 4), yellow, "second frame");

        medium.advance_frame();
        assert_eq!(medium.frame().offset(), (0, 0));
        renderer.render_to_sprite(&canvas, &medium, 1.0);
        assert_color_near(canvas.color_at(4, 4), green, "wrapped around");
    });
}
