use std::{path::PathBuf, time::Duration};

use clap::Parser;
use rigsync::prelude::*;

#[derive(Debug, clap::Parser)]
struct Args {
    /// Viewport width, used for the camera aspect and screen clicks
    #[arg(long, default_value = "1600")]
    pub width: u32,
    /// Viewport height
    #[arg(long, default_value = "900")]
    pub height: u32,
    /// glTF vehicle model; a procedural placeholder is used when omitted
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Also build a second vehicle at (-2, 2, 0)
    #[arg(long)]
    pub second_car: bool,
    /// Number of frames to simulate
    #[arg(long, default_value = "600")]
    pub frames: u64,
    /// Vertical gravity component
    #[arg(long, default_value = "-9.81", allow_hyphen_values = true)]
    pub gravity: f32,
    /// Hide the physics wireframe
    #[arg(long)]
    pub no_debug: bool,
    /// Click the middle of the viewport every N frames
    #[arg(long)]
    pub click_every: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("viewport must not be empty: {}x{}", args.width, args.height);
    }
    let viewport = Vec2::new(args.width as f32, args.height as f32);

    let config = SimulationConfig {
        gravity: Vec3::new(0.0, args.gravity, 0.0),
        debug_render: !args.no_debug,
        aspect: viewport.x / viewport.y,
        ..Default::default()
    };
    let mut app = App::new(config);
    app.spawn_showcase()?;

    let mut spawns = vec![Vec3::new(0.0, 2.0, 0.0)];
    if args.second_car {
        spawns.push(Vec3::new(-2.0, 2.0, 0.0));
    }
    for spawn in spawns {
        let task = match &args.model {
            Some(path) => ConstructionTask::spawn(path.clone(), spawn),
            None => ConstructionTask::from_scene(rigsync::asset::placeholder_vehicle(), spawn),
        };
        app.request_vehicle(task);
    }

    let mut time = Time::new();
    let mut last_report = 0.0;
    for frame in 0..args.frames {
        std::thread::sleep(Duration::from_millis(16));
        let delta = time.update();
        app.tick(delta);

        if let Some(every) = args.click_every {
            if every > 0 && frame % every == 0 {
                match app.click(viewport / 2.0, viewport) {
                    Some(object) => log::info!("click hit {object:?}"),
                    None => log::info!("click hit nothing"),
                }
            }
        }

        if time.total_seconds - last_report >= 1.0 {
            last_report = time.total_seconds;
            log::info!(
                "frame {}: {:.1} fps, {} bindings, {} bodies, {} debug vertices",
                time.frame_count,
                time.average_fps(),
                app.registry().len(),
                app.physics().body_count(),
                app.scene()
                    .get(app.debug_renderer().object())
                    .and_then(|object| object.as_lines())
                    .map_or(0, |lines| lines.vertex_count()),
            );
        }
    }

    for rig in app.rigs() {
        if let Some(position) = app.physics().body_translation(rig.chassis.body) {
            log::info!("vehicle rig {} came to rest at {position}", rig.id.get());
        }
    }
    if app.pending_vehicles() > 0 {
        log::warn!("{} vehicles were still loading", app.pending_vehicles());
    }

    Ok(())
}
