//! Window demo: an animated sheet sprite next to a two-tone sprite whose
//! colors cycle through a shared palette, both drawn straight to the screen.
//!
//! Run with `cargo run --example palette_swap`.

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use spritewell::prelude::*;
use spritewell::{env_logger, gl};
use std::ffi::CString;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const STEP_INTERVAL: Duration = Duration::from_millis(400);

const CYCLE: [Color; 3] = [
    Color::new(1.0, 0.5, 0.0, 1.0),
    Color::new(0.5, 0.0, 1.0, 1.0),
    Color::new(0.0, 1.0, 0.5, 1.0),
];

fn texture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets/textures")
        .join(file)
}

struct DemoState {
    renderer: SpriteRenderer,
    two_tone: Sprite,
    frames: Sprite,
    palette: SharedPtr<Palette>,
    cycle_index: usize,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    window: Window,
}

#[derive(Default)]
struct Demo {
    state: Option<DemoState>,
    last_step: Option<Instant>,
}

impl Demo {
    fn step_and_draw(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let due = self
            .last_step
            .is_none_or(|last| last.elapsed() >= STEP_INTERVAL);
        if due {
            self.last_step = Some(Instant::now());
            state.frames.advance_frame();

            // Swap the replacement for the red key to the next cycle color.
            state.cycle_index = (state.cycle_index + 1) % CYCLE.len();
            let mut palette = state.palette.borrow_mut();
            palette.clear();
            palette
                .push(Color::opaque(1.0, 0.0, 0.0), CYCLE[state.cycle_index])
                .unwrap();
        }

        unsafe {
            gl::ClearColor(0.1, 0.1, 0.1, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
        state.renderer.render_to_screen(&state.two_tone);
        state.renderer.render_to_screen(&state.frames);

        state.gl_surface.swap_buffers(&state.gl_context).unwrap();
        state.window.request_redraw();
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title("spritewell palette swap")
            .with_inner_size(winit::dpi::PhysicalSize::new(640, 480));
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));

        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
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
        unsafe { gl::Viewport(0, 0, 640, 480) };

        let renderer = SpriteRenderer::new().unwrap();

        let mut two_tone = Sprite::from_png(&renderer, texture_path("two_tone.png")).unwrap();
        two_tone.set_position(80, 180);
        two_tone.set_scale(16.0, 16.0);
        let palette = shared_ptr(Palette::new());
        two_tone.set_palette_a(Some(palette.clone()));

        let mut frames =
            Sprite::animated_from_png(&renderer, texture_path("sheet.png"), 8, 8).unwrap();
        frames.set_position(380, 180);
        frames.set_scale(16.0, 16.0);
        frames.set_tint(Some(Color::new(1.0, 1.0, 1.0, 0.9)));

        self.state = Some(DemoState {
            renderer,
            two_tone,
            frames,
            palette,
            cycle_index: 0,
            gl_context,
            gl_surface,
            window,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.step_and_draw(),
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut Demo::default()).unwrap();
}
