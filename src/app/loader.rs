use std::path::PathBuf;

use crossbeam_channel::{Receiver, TryRecvError};
use glam::Vec3;

use crate::{asset, error::ConstructionError, scene::Scene};

/// Loads one vehicle asset off the frame thread and reports it over a channel.
///
/// The rig itself is built by the app once the asset arrives, so a rig never
/// becomes visible before all of its parts exist.
#[derive(Debug)]
pub struct ConstructionTask {
    spawn: Vec3,
    source: String,
    rx: Receiver<Result<Scene, ConstructionError>>,
}

impl ConstructionTask {
    /// Starts loading the glTF file at `path` on the rayon pool.
    pub fn spawn(path: impl Into<PathBuf>, spawn: Vec3) -> Self {
        let path = path.into();
        let source = path.display().to_string();
        let (tx, rx) = crossbeam_channel::bounded(1);

        rayon::spawn(move || {
            let result = asset::load_gltf(&path)
                .map_err(|err| ConstructionError::Asset(format!("{}: {err}", path.display())));
            let _ = tx.send(result);
        });

        Self { spawn, source, rx }
    }

    /// A task whose asset is already in memory.
    pub fn from_scene(asset: Scene, spawn: Vec3) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(Ok(asset));
        Self {
            spawn,
            source: "<in-memory>".to_string(),
            rx,
        }
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.spawn
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the loaded asset if the task is done, without blocking.
    pub fn try_finish(&self) -> Option<Result<Scene, ConstructionError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ConstructionError::TaskLost)),
        }
    }

    /// Blocks until the task is done.
    pub fn wait(self) -> Result<Scene, ConstructionError> {
        self.rx.recv().map_err(|_| ConstructionError::TaskLost)?
    }
}
