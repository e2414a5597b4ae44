use std::time::{Duration, Instant};

use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};

use crate::{
    abs::App,
    config::Config,
    render::{FrameRenderer, GlBackend},
    tick::Ticker,
};

mod abs;
mod cli;
mod config;
mod error;
mod logging;
mod render;
mod tick;

fn main() {
    let args = cli::parse();

    let config = Config::resolve(args.config.as_deref());
    let level = args
        .log_level
        .or_else(|| config.as_ref().ok().map(|config| config.log_level))
        .unwrap_or(log::LevelFilter::Info);
    if let Err(e) = logging::setup_logger(level) {
        eprintln!("Failed to set up logging: {e}");
    }

    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    config.apply_args(&args);

    if let Err(e) = run(&config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    )?;

    let backend = GlBackend::new(&app.gl)?;
    let (width, height) = app.drawable_size();
    let mut renderer = FrameRenderer::new(backend, config.scene.clone(), width, height);

    renderer.initialize(&config.texture, config.background_path())?;
    renderer.resize(width, height)?;
    log::info!(
        "Scene ready at {}x{}, background {}",
        width,
        height,
        if renderer.has_background() {
            "on"
        } else {
            "off"
        }
    );

    let mut ticker = Ticker::new(
        Duration::from_millis(config.window.tick_interval_ms),
        Instant::now(),
    );
    log::debug!("Ticking every {:?}", ticker.interval());

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    // `poll_iter` holds the event pump, so only the window field is borrowed here.
                    let (width, height) = app.window.drawable_size();
                    renderer.resize(width, height)?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if ticker.poll(now) {
            renderer.advance()?;
            renderer.render_frame()?;
            app.window.gl_swap_window();
        } else {
            std::thread::sleep(ticker.time_until_next(now));
        }
    }

    log::info!(
        "Stopped at {:.1} degrees",
        renderer.angle().unwrap_or_default()
    );
    Ok(())
}
