//! Skyburst - fireworks that launch on the beat
//!
//! Every analysis hop of the playing audio is split into frequency bands;
//! sudden energy jumps in a band burst into particles whose color, size
//! and lifetime follow the band and the strength of the hit.

use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use skyburst::audio::{AudioSource, AudioSystem, SpectrumSource};
use skyburst::camera::CameraSystem;
use skyburst::cli::Args;
use skyburst::effects::RenderSink;
use skyburst::params::{RecordingConfig, ShowConfig};
use skyburst::rendering::RenderSystem;
use skyburst::show::FireworkShow;
use skyburst::sky::StarField;
use skyburst::{Error, Result};

/// How long the title flashes after an onset
const BOOM_FLASH: Duration = Duration::from_millis(100);

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Audio and analysis
    audio: Option<AudioSystem>,
    spectrum: Option<SpectrumSource>,
    source: AudioSource,

    // Show
    show: FireworkShow,
    camera: CameraSystem,
    stars: StarField,

    // Configuration
    config: ShowConfig,
    recording_config: Option<RecordingConfig>,

    // Time tracking
    start_time: Instant,
    frame_num: usize,
    boom_until: Option<Instant>,
    title: String,

    /// Setup failure reported after the event loop exits
    failure: Option<Error>,
}

impl App {
    fn new(
        config: ShowConfig,
        recording_config: Option<RecordingConfig>,
        source: AudioSource,
        seed: Option<u64>,
    ) -> Self {
        let show = FireworkShow::new(&config, seed);
        let camera = CameraSystem::new(config.camera.clone(), &config.render);
        let stars = StarField::new(&config.render, seed.unwrap_or_else(rand::random));

        Self {
            window: None,
            render_system: None,
            audio: None,
            spectrum: None,
            source,
            show,
            camera,
            stars,
            config,
            recording_config,
            start_time: Instant::now(),
            frame_num: 0,
            boom_until: None,
            title: String::new(),
            failure: None,
        }
    }

    /// Window, GPU and audio, in that order
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Skyburst")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.render.window_width,
                self.config.render.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| Error::Window(e.to_string()))?,
        );

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.config.render,
            self.recording_config.clone(),
        ))?;

        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);

        let audio = AudioSystem::new(
            &self.source,
            &self.config.fft,
            self.recording_config.as_ref(),
        )?;

        // Analyse at whatever rate the device actually runs
        let mut fft_config = self.config.fft.clone();
        fft_config.sample_rate_hz = audio.sample_rate_hz();
        let spectrum = SpectrumSource::new(fft_config, audio.pcm());

        log::info!("Skyburst is running! Space pauses, ESC quits");
        if let Some(ref config) = self.recording_config {
            log::info!(
                "Recording {} frames to {}/",
                config.total_frames(),
                config.output_dir
            );
        }

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.audio = Some(audio);
        self.spectrum = Some(spectrum);
        self.start_time = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        self.failure = Some(error);
        event_loop.exit();
    }

    /// Seconds of show time; recordings advance exactly one frame period
    /// per frame
    fn show_time(&self) -> f32 {
        match &self.recording_config {
            Some(config) => self.frame_num as f32 / config.fps as f32,
            None => self.start_time.elapsed().as_secs_f32(),
        }
    }

    fn update_title(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let flowing = self.audio.as_ref().is_some_and(|a| a.is_flowing());
        let paused = self.audio.as_ref().is_some_and(|a| a.is_paused());

        let status = if self.boom_until.is_some_and(|t| Instant::now() < t) {
            "BOOM!"
        } else if paused {
            "Paused"
        } else if flowing {
            "Playing..."
        } else {
            "Finished"
        };

        let title = format!("Skyburst - {}", status);
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }

    /// Analyse pending audio, step the show and render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let time_s = self.show_time();
        let (Some(render_system), Some(audio), Some(spectrum)) = (
            self.render_system.as_mut(),
            self.audio.as_ref(),
            self.spectrum.as_mut(),
        ) else {
            return;
        };

        // Zero or more analysis hops since the last frame
        let show = &mut self.show;
        let mut onsets = 0;
        spectrum.poll(|bins, now| {
            onsets += show.on_spectrum(bins, now, &mut *render_system).len();
        });
        if onsets > 0 {
            self.boom_until = Some(Instant::now() + BOOM_FLASH);
        }

        show.on_frame(audio.is_flowing(), &mut *render_system);

        let (view, proj) = self.camera.view_and_projection(time_s, &self.config.render);

        match render_system.render(view, proj, &self.stars, time_s, self.frame_num) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, Error::GpuInit("out of GPU memory".to_string()));
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
        self.frame_num += 1;

        self.update_title();

        if let Some(ref config) = self.recording_config {
            if self.frame_num >= config.total_frames() {
                log::info!("Recording complete: {} frames", self.frame_num);
                event_loop.exit();
            }
        }
    }

    fn toggle_pause(&mut self) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        if let Err(e) = audio.toggle_pause() {
            log::warn!("{}", e);
            return;
        }
        self.update_title();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => self.toggle_pause(),
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.set_viewport(size.width, size.height);
                }
                self.camera.set_aspect(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
            }
            _ => {}
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.show_config()?;
    let recording_config = args.create_recording_config()?;

    let mut app = App::new(config, recording_config, args.audio_source(), args.seed);
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Skyburst - audio-reactive fireworks");
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
