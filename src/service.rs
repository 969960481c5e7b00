//! Caller-facing operations: discover, look up and launch games.
//!
//! Every operation returns either its response or an [`ErrorResponse`];
//! nothing here panics or propagates a raw error.

use crate::config::Config;
use crate::discovery;
use crate::error::{GameScanError, Result};
use crate::model::{Catalog, DiscoverResponse, ErrorResponse, GameInfo, LaunchResponse};
use crate::scanner::{all_scanners, ScanContext, Scanner};
use std::io;
use std::path::Path;
use std::process::Command;

/// Starts a game process.
pub trait Launcher: Send + Sync {
    fn launch(&self, executable: &Path, working_dir: &Path) -> io::Result<()>;
}

/// Spawns the executable and leaves it running unsupervised.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, executable: &Path, working_dir: &Path) -> io::Result<()> {
        Command::new(executable)
            .current_dir(working_dir)
            .spawn()
            .map(|_| ())
    }
}

pub struct GameService {
    scanners: Vec<Box<dyn Scanner>>,
    ctx: ScanContext,
    launcher: Box<dyn Launcher>,
}

impl GameService {
    /// A service over every scanner, the system registry and real processes.
    pub fn new(config: Config) -> Self {
        Self {
            scanners: all_scanners(),
            ctx: ScanContext::new(config),
            launcher: Box::new(ProcessLauncher),
        }
    }

    pub fn with_scanners(mut self, scanners: Vec<Box<dyn Scanner>>) -> Self {
        self.scanners = scanners;
        self
    }

    pub fn with_context(mut self, ctx: ScanContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn with_launcher(mut self, launcher: Box<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn context(&self) -> &ScanContext {
        &self.ctx
    }

    /// Runs a full discovery.
    pub async fn catalog(&self) -> Catalog {
        discovery::discover(&self.scanners, &self.ctx).await
    }

    pub async fn discover_games(&self) -> std::result::Result<DiscoverResponse, ErrorResponse> {
        Ok(DiscoverResponse::from(&self.catalog().await))
    }

    /// Games whose name contains `name`, ignoring case.
    pub async fn get_game_info(&self, name: &str) -> std::result::Result<Vec<GameInfo>, ErrorResponse> {
        self.find(name).await.map_err(ErrorResponse::new)
    }

    /// Launches the game whose name equals `name`, ignoring case.
    pub async fn launch_game(&self, name: &str) -> std::result::Result<LaunchResponse, ErrorResponse> {
        self.launch(name).await.map_err(|e| {
            tracing::warn!("launch of '{}' failed: {}", name, e);
            ErrorResponse::new(e)
        })
    }

    async fn find(&self, name: &str) -> Result<Vec<GameInfo>> {
        let matches = discovery::find(&self.scanners, &self.ctx, name).await;
        if matches.is_empty() {
            return Err(GameScanError::NoMatch(name.to_string()));
        }
        Ok(matches.iter().map(GameInfo::from).collect())
    }

    async fn launch(&self, name: &str) -> Result<LaunchResponse> {
        let catalog = self.catalog().await;
        let record = catalog
            .find_exact(name)
            .ok_or_else(|| GameScanError::NotFound(name.to_string()))?;
        let executable = record
            .executable
            .as_ref()
            .ok_or_else(|| GameScanError::NoExecutable(record.name.clone()))?;
        if !executable.is_file() {
            return Err(GameScanError::ExecutableMissing(executable.clone()));
        }

        let working_dir = executable.parent().unwrap_or(record.install_path.as_path());
        self.launcher
            .launch(executable, working_dir)
            .map_err(|source| GameScanError::Launch {
                path: executable.clone(),
                source,
            })?;

        tracing::info!("launched {:?}", executable);
        Ok(LaunchResponse {
            success: true,
            message: format!("Launched {} ({})", record.name, executable.display()),
            executable: executable.display().to_string(),
        })
    }
}
