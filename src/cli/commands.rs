//! Subcommand handlers for render, animate and palettes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::args::RenderArgs;
use super::enums::Format;
use crate::ascii::{random_seed, resolve_palette, CharSet, CharacterGrid, Palette, Rgba};
use crate::canvas::CanvasRenderer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event_loop::{self, LoopEvent, LoopSettings};
use crate::font::{FontdueMetrics, GlyphMetrics};
use crate::layout::{LayoutState, Transform};
use crate::pipeline::{Pipeline, RenderConfig};
use crate::raster::CursorStyle;
use crate::renderer::{render_ansi, render_html, render_json, render_plain, TextFormat};
use crate::source::{ImageSource, SourceLoader};
use crate::worker::{RenderStatus, WorkerHandle};

/// How long `render --worker` waits for its result.
const WORKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Update period of the scripted cursor orbit in `animate`.
const ORBIT_STEP: Duration = Duration::from_millis(16);

/// Background that translucent glyph colours are composited over.
const TERMINAL_BACKGROUND: Rgba = Rgba::BLACK;

/// Config and flags merged, with the font and pipeline built from them.
struct Session {
    config: Config,
    metrics: Option<FontdueMetrics>,
    pipeline: Pipeline,
}

impl Session {
    fn prepare(config_path: Option<&Path>, args: &RenderArgs) -> Result<Self> {
        let mut config = Config::load(config_path)?;
        args.apply(&mut config);

        let metrics = match config.font.path {
            Some(ref path) => Some(FontdueMetrics::load(path)?),
            None => None,
        };
        // A loaded font sets the aspect unless --aspect pins it
        if let (Some(m), None) = (&metrics, args.aspect) {
            config.render.font_aspect_ratio = m.aspect_ratio(&config.font);
        }

        let mut pipeline =
            Pipeline::new(config.render.clone()).with_palettes(config.palettes.clone());
        if let Some(cursor) = &config.render.cursor {
            if let (CursorStyle::Image, Some(path)) = (cursor.style, &cursor.image) {
                let stamp = ImageSource::load(path)?;
                pipeline = pipeline.with_cursor_stamp(stamp.as_image().clone());
            }
        }

        Ok(Self {
            config,
            metrics,
            pipeline,
        })
    }

    fn palette(&self) -> Palette {
        let render = &self.config.render;
        let external = (!self.config.palettes.is_empty()).then_some(&self.config.palettes);
        resolve_palette(&render.character_set, &render.custom_character_set, external)
    }
}

fn seed_for(render: &RenderConfig, seed: Option<u32>) -> u32 {
    match seed {
        Some(s) => s,
        None if render.dither.is_seeded() => random_seed(),
        None => 0,
    }
}

async fn load_source(path: PathBuf) -> Result<ImageSource> {
    SourceLoader::new()
        .load(path)
        .await
        .unwrap_or_else(|| Err(Error::Worker("image load was superseded".to_string())))
}

/// Render an image once and print it.
#[allow(clippy::too_many_arguments)]
pub fn render(
    config_path: Option<&Path>,
    image: PathBuf,
    args: &RenderArgs,
    format: Format,
    png: Option<PathBuf>,
    seed: Option<u32>,
    cursor: Option<(f32, f32)>,
    use_worker: bool,
) -> Result<()> {
    let mut session = Session::prepare(config_path, args)?;
    let rt = tokio::runtime::Runtime::new()?;
    let source = rt.block_on(load_source(image))?;
    let seed = seed_for(session.pipeline.config(), seed);

    let grid = if use_worker {
        transform_on_worker(&session.pipeline, &source, cursor, seed)?
    } else {
        session.pipeline.run(&source, cursor, seed)
    };

    let mut canvas = CanvasRenderer::new(session.config.font.clone(), session.metrics.take());
    let (nw, nh) = canvas.natural_size(&grid);
    let natural = (nw as f32, nh as f32);
    let layout = session.config.layout;
    let mut state = LayoutState::new();
    state.update(natural, layout.container(), layout.mode);
    let transform = state.transform();

    let text = match TextFormat::from(format) {
        TextFormat::Plain => render_plain(&grid),
        TextFormat::Ansi => render_ansi(&grid, TERMINAL_BACKGROUND),
        TextFormat::Html => render_html(&grid, transform, &session.config.font),
        TextFormat::Json => render_json(&grid).map_err(std::io::Error::from)?,
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;

    if let Some(path) = png {
        let size = canvas_size(layout.width, layout.height, natural, transform);
        let image = canvas.render(&grid, &session.palette(), size, transform);
        image.save(&path)?;
        log::info!("Wrote {}x{} canvas to {}", size.0, size.1, path.display());
    }

    Ok(())
}

fn transform_on_worker(
    pipeline: &Pipeline,
    source: &ImageSource,
    cursor: Option<(f32, f32)>,
    seed: u32,
) -> Result<CharacterGrid> {
    let mut worker = WorkerHandle::spawn()?;
    let samples = pipeline.sample(source, cursor);
    worker.submit(samples, pipeline.transform_params(), seed)?;
    if let Some(grid) = worker.wait(WORKER_TIMEOUT) {
        return Ok(grid.clone());
    }
    match worker.status() {
        RenderStatus::Error(e) => Err(Error::Worker(e.clone())),
        _ => Err(Error::Worker("timed out waiting for worker".to_string())),
    }
}

/// Canvas size: the container where set, else the scaled content.
fn canvas_size(
    width: Option<f32>,
    height: Option<f32>,
    natural: (f32, f32),
    transform: Transform,
) -> (u32, u32) {
    let w = width.unwrap_or(natural.0 * transform.scale);
    let h = height.unwrap_or(natural.1 * transform.scale);
    (w.round().max(1.0) as u32, h.round().max(1.0) as u32)
}

/// Fractional cursor position on a circle around the centre at time `t`.
fn orbit(t: f32) -> (f32, f32) {
    (0.5 + 0.35 * t.cos(), 0.5 + 0.35 * t.sin())
}

/// Animate an image in the terminal until Ctrl-C or `frames` re-runs.
pub fn animate(
    config_path: Option<&Path>,
    image: PathBuf,
    args: &RenderArgs,
    static_ms: Option<u64>,
    frames: Option<u64>,
    seed: Option<u32>,
) -> Result<()> {
    let mut session = Session::prepare(config_path, args)?;
    if static_ms.is_some() {
        session.config.animation.static_interval_ms = static_ms;
    }
    let static_interval = session.config.animation.static_interval();
    let cursor = session.config.render.cursor.clone();

    let settings = LoopSettings {
        static_interval,
        smoothing: cursor.as_ref().map(|c| c.smoothing),
        seed: seed_for(&session.config.render, seed),
        max_frames: frames,
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    })
    .map_err(std::io::Error::other)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let source = load_source(image).await?;
        let (tx, rx) = mpsc::channel(64);

        // Static animation re-seeds on its own timer; only the cursor needs input
        if cursor.is_some() && static_interval.is_none() {
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(ORBIT_STEP);
                let mut t = 0.0f32;
                loop {
                    ticker.tick().await;
                    let (x, y) = orbit(t);
                    if tx.send(LoopEvent::Pointer { x, y }).await.is_err() {
                        break;
                    }
                    t += ORBIT_STEP.as_secs_f32();
                }
            });
        } else {
            drop(tx);
        }

        let mut pipeline = session.pipeline;
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b[2J\x1b[?25l")?;

        let result = event_loop::run(
            rx,
            stop_rx,
            settings,
            session.config.render.clone(),
            |rerun| {
                if rerun.config != pipeline.config() {
                    pipeline.set_config(rerun.config.clone());
                }
                let grid = pipeline.run(&source, rerun.cursor, rerun.seed);
                write!(stdout, "\x1b[H{}", render_ansi(&grid, TERMINAL_BACKGROUND))?;
                stdout.flush()?;
                Ok(())
            },
        )
        .await;

        let mut stdout = std::io::stdout();
        writeln!(stdout, "\x1b[0m\x1b[?25h")?;
        let frames = result?;
        log::info!("Rendered {} frames", frames);
        Ok::<(), Error>(())
    })
}

/// Print built-in and configured palettes.
pub fn list_palettes(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let mut stdout = std::io::stdout().lock();

    writeln!(stdout, "Built-in palettes:")?;
    for set in CharSet::ALL {
        writeln!(stdout, "  {:<10} {}", set.name(), set.chars())?;
    }

    if !config.palettes.is_empty() {
        writeln!(stdout)?;
        writeln!(stdout, "Config palettes:")?;
        let mut names: Vec<_> = config.palettes.keys().collect();
        names.sort();
        for name in names {
            writeln!(stdout, "  {:<10} {}", name, config.palettes[name])?;
        }
    }

    writeln!(stdout)?;
    writeln!(stdout, "Use --charset <name>, or --charset custom --custom-charset <glyphs>.")?;
    Ok(())
}
