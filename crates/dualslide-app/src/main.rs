//! Command-line entry point (native).
//!
//! Runs a presenter and an in-process audience over the local link, walks
//! through the document and writes every rendered view as PNG.

#[cfg(feature = "native")]
mod cli {
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use clap::Parser;
    use dualslide_app::{
        AppError, Audience, AudienceConfig, ExportError, Presenter, PresenterConfig, UiEvent,
        write_png,
    };
    use dualslide_core::{LayoutConfig, LayoutError, LocalWindowOpener, NotesLocation, SystemClock};
    use dualslide_render::{EngineError, PdfEngine, Raster};
    use thiserror::Error;

    #[derive(Parser, Debug)]
    #[command(
        name = "dualslide",
        version,
        about = "Render presenter and audience views of a slides-with-notes PDF"
    )]
    pub struct Cli {
        /// PDF file or http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Where the notes sit on each page: right, left, top or bottom
        #[arg(long, default_value = "right")]
        location: NotesLocation,

        /// Fraction of the page taken by the slide
        #[arg(long, default_value_t = dualslide_core::DEFAULT_SPLIT)]
        split: f64,

        #[arg(long, default_value_t = dualslide_core::DEFAULT_SCALE)]
        scale: f64,

        /// Render only the first N pages
        #[arg(long, value_name = "N")]
        pages: Option<u32>,

        /// Output directory for PNG frames
        #[arg(long, short, default_value = "dualslide-out")]
        out: PathBuf,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("Built without a PDF engine; rebuild with `--features pdfium`")]
        NoEngine,
        #[error(transparent)]
        Engine(#[from] EngineError),
        #[error(transparent)]
        Layout(#[from] LayoutError),
        #[error(transparent)]
        App(#[from] AppError),
        #[error(transparent)]
        Export(#[from] ExportError),
        #[error("Failed to create {path}: {reason}")]
        OutputDir { path: String, reason: String },
        #[error("Audience window did not open")]
        NoAudience,
    }

    /// One engine per window; they never share a document.
    #[cfg(feature = "pdfium")]
    fn create_engines() -> Result<(Box<dyn PdfEngine>, Box<dyn PdfEngine>), CliError> {
        let engine = dualslide_render::PdfiumEngine::load()?;
        Ok((Box::new(engine.clone()), Box::new(engine)))
    }

    #[cfg(not(feature = "pdfium"))]
    fn create_engines() -> Result<(Box<dyn PdfEngine>, Box<dyn PdfEngine>), CliError> {
        Err(CliError::NoEngine)
    }

    fn is_url(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    fn export(raster: Option<&Raster>, dir: &Path, name: String) -> Result<(), CliError> {
        if let Some(raster) = raster {
            write_png(raster, &dir.join(name))?;
        }
        Ok(())
    }

    pub async fn run(cli: Cli) -> Result<(), CliError> {
        let layout = LayoutConfig::new(cli.location, cli.split, cli.scale)?;
        let (presenter_engine, audience_engine) = create_engines()?;

        let (opener, inbox) = LocalWindowOpener::new();
        let mut presenter = Presenter::new(
            PresenterConfig {
                layout,
                ..PresenterConfig::default()
            },
            presenter_engine,
            Box::new(opener.clone()),
            Box::new(inbox),
            Rc::new(SystemClock),
        );

        let pages = if is_url(&cli.source) {
            presenter.load_from_url(&cli.source).await?
        } else {
            presenter.load_from_file(Path::new(&cli.source)).await?
        };

        if !presenter.open_audience_window() {
            return Err(CliError::NoAudience);
        }
        let endpoint = opener.take_opened().ok_or(CliError::NoAudience)?;
        let mut audience = Audience::from_endpoint(
            AudienceConfig {
                scale: cli.scale,
                ..AudienceConfig::default()
            },
            audience_engine,
            endpoint,
        );
        audience.start();
        for event in presenter.poll() {
            if let UiEvent::Audience(event) = event {
                log::info!("Audience: {:?}", event);
            }
        }
        audience.poll().await;

        std::fs::create_dir_all(&cli.out).map_err(|e| CliError::OutputDir {
            path: cli.out.display().to_string(),
            reason: e.to_string(),
        })?;

        let last = cli.pages.map_or(pages, |n| n.min(pages));
        for page in 1..=last {
            presenter.navigate_to(page).await?;
            audience.poll().await;

            let previews = presenter.previews();
            export(
                previews.slide.as_ref().map(|s| &s.raster),
                &cli.out,
                format!("page-{:03}-slide.png", page),
            )?;
            export(
                previews.notes.as_ref().map(|s| &s.raster),
                &cli.out,
                format!("page-{:03}-notes.png", page),
            )?;
            export(
                audience.frame().as_ref(),
                &cli.out,
                format!("page-{:03}-audience.png", page),
            )?;
        }

        log::info!(
            "Rendered {} of {} pages to {} (audience connected: {})",
            last,
            pages,
            cli.out.display(),
            presenter.is_connected()
        );
        Ok(())
    }
}

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Starting Dualslide");

    let cli = cli::Cli::parse();
    if let Err(e) = pollster::block_on(cli::run(cli)) {
        log::error!("{}", e);
        eprintln!("dualslide: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
