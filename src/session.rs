//! The slicing session: one source image, one mode flag, one set of results.
//!
//! # State Machine
//!
//! ```text
//!            upload                process
//!   Idle ───────────▶ Loaded ───────────────▶ Processed ──┐
//!    ▲                  ▲  ▲                    │   ▲     │ download
//!    │                  │  └── toggle mode ─────┘   └─────┘ (process again)
//!    └──── reset ───────┴──────────────────────────────────
//! ```
//!
//! | Command | Allowed in | Result |
//! |---|---|---|
//! | `upload` | any | Loaded with the new image; old results dropped (state untouched on any error) |
//! | `set_mode` | any | mode stored; Processed drops its now-stale slices → Loaded |
//! | `process` | Loaded, Processed | Processed |
//! | `download` | Processed | archive; state untouched, so a failed save can be retried |
//! | `reset` | any | Idle (the mode flag is kept) |
//!
//! Commands take `&self`/`&mut self`, so a session runs one command at a time.
//! Decoding, rendering and packaging run on tokio's blocking pool and the
//! caller awaits them; nothing is cancelled half way.

use crate::config::{ConfigError, SlicerConfig};
use crate::imaging::{
    BackendError, FullViewComposite, ImageBackend, LayoutParams, RenderConfig, Slice, SliceMode,
    SlicingPlan, calculate_slicing_plan, compose_full_view, render_slices,
};
use crate::package::{Archive, PackageError, package};
use crate::source::{SourceError, SourceImage, load_source};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loaded,
    Processed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::Idle => "no image is loaded",
            SessionPhase::Loaded => "an image is loaded",
            SessionPhase::Processed => "slices are ready",
        })
    }
}

/// Commands with a precondition on the session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Process,
    Download,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Process => "process",
            Command::Download => "download",
        })
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Upload(#[from] SourceError),
    #[error("Failed to generate slices: {0}")]
    Render(#[from] BackendError),
    #[error("There was a problem creating your zip file: {0}")]
    PackagingFailure(#[from] PackageError),
    #[error("Cannot {command} while {phase}")]
    InvalidTransition {
        command: Command,
        phase: SessionPhase,
    },
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Everything one process action produced.
#[derive(Debug)]
pub struct ProcessedRun {
    /// Mode the slices were rendered in; decides the archive folder.
    pub mode: SliceMode,
    pub plan: SlicingPlan,
    pub full_view: FullViewComposite,
    pub slices: Vec<Slice>,
}

#[derive(Debug)]
enum State {
    Idle,
    Loaded {
        source: SourceImage,
    },
    Processed {
        source: SourceImage,
        run: Arc<ProcessedRun>,
    },
}

/// Run a blocking step on tokio's blocking pool and await it.
async fn run_blocking<T, E, F>(task: F) -> Result<T, SessionError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<SessionError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| SessionError::TaskFailed(e.to_string()))?
        .map_err(Into::into)
}

/// A single slicing session owning all mutable state.
pub struct Session<B> {
    backend: Arc<B>,
    layout: LayoutParams,
    render: RenderConfig,
    archive_name: String,
    mode: SliceMode,
    state: State,
}

impl<B: ImageBackend + 'static> Session<B> {
    pub fn new(backend: B, config: &SlicerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            backend: Arc::new(backend),
            layout: config.layout_params(),
            render: config.render_config()?,
            archive_name: config.output.archive_name.clone(),
            mode: SliceMode::default(),
            state: State::Idle,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Idle => SessionPhase::Idle,
            State::Loaded { .. } => SessionPhase::Loaded,
            State::Processed { .. } => SessionPhase::Processed,
        }
    }

    pub fn mode(&self) -> SliceMode {
        self.mode
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.state {
            State::Idle => None,
            State::Loaded { source } | State::Processed { source, .. } => Some(source),
        }
    }

    pub fn processed(&self) -> Option<&ProcessedRun> {
        match &self.state {
            State::Processed { run, .. } => Some(run),
            _ => None,
        }
    }

    /// The plan the next `process` would use, if an image is loaded.
    pub fn preview_plan(&self) -> Option<SlicingPlan> {
        self.source()
            .map(|s| calculate_slicing_plan(s.dimensions(), self.mode, &self.layout))
    }

    fn reject(&self, command: Command) -> SessionError {
        let phase = self.phase();
        log::warn!("rejected {command}: {phase}");
        SessionError::InvalidTransition { command, phase }
    }

    /// Validate and decode an image, replacing whatever the session held.
    /// Returns its dimensions.
    pub async fn upload(&mut self, bytes: Vec<u8>) -> Result<(u32, u32), SessionError> {
        log::info!("Loading your image...");
        let backend = Arc::clone(&self.backend);
        let source = run_blocking(move || load_source(backend.as_ref(), &bytes)).await?;
        let dims = source.dimensions();

        log::info!("loaded {}x{} {}", dims.0, dims.1, source.mime_type());
        self.state = State::Loaded { source };
        Ok(dims)
    }

    /// Switch between standard and high-res slicing.
    pub fn set_mode(&mut self, mode: SliceMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        log::info!("mode set to {mode:?}");

        self.state = match std::mem::replace(&mut self.state, State::Idle) {
            State::Processed { source, .. } => {
                log::debug!("discarding slices rendered in the previous mode");
                State::Loaded { source }
            }
            other => other,
        };
    }

    /// Render the slices and the full view for the current mode.
    pub async fn process(&mut self) -> Result<SlicingPlan, SessionError> {
        let source = match &self.state {
            State::Idle => return Err(self.reject(Command::Process)),
            State::Loaded { source } | State::Processed { source, .. } => source.clone(),
        };

        let mode = self.mode;
        let plan = calculate_slicing_plan(source.dimensions(), mode, &self.layout);
        log::info!(
            "Generating slices... {} x {}x{}",
            plan.slice_count,
            plan.slice_width,
            plan.slice_height
        );

        let backend = Arc::clone(&self.backend);
        let render = self.render;
        let pixels = source.shared_pixels();
        let (full_view, slices) = run_blocking(move || -> Result<_, BackendError> {
            let slices = render_slices(backend.as_ref(), &pixels, &plan, render.quality)?;
            let full_view = compose_full_view(backend.as_ref(), &pixels, &plan, &render)?;
            Ok((full_view, slices))
        })
        .await?;

        self.state = State::Processed {
            source,
            run: Arc::new(ProcessedRun {
                mode,
                plan,
                full_view,
                slices,
            }),
        };
        Ok(plan)
    }

    /// Package the processed run into an in-memory archive.
    pub async fn download(&self) -> Result<Archive, SessionError> {
        let State::Processed { run, .. } = &self.state else {
            return Err(self.reject(Command::Download));
        };

        log::info!("Creating archive...");
        let run = Arc::clone(run);
        let name = self.archive_name.clone();
        run_blocking(move || package(&name, run.mode, &run.full_view, &run.slices)).await
    }

    /// Package the processed run and save it to `path`.
    pub async fn download_to(&self, path: &Path) -> Result<Archive, SessionError> {
        let archive = self.download().await?;
        archive.write_to(path)?;
        log::info!("saved {}", path.display());
        Ok(archive)
    }

    /// Drop the image and any results.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        log::info!("session reset");
    }
}
