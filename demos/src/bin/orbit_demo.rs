//! # Orbit Demo
//!
//! A producer thread simulates a spinning particle lattice and streams it to
//! the viewer through the live point and line buffers. Every simulation step
//! meets the execution barrier, so `--start paused` freezes the producer
//! until it is stepped.
//!
//! Runs on the headless surface; pair `--max-frames` with `--snapshot` to
//! write the final frame to disk.

use std::thread;
use std::time::Duration;

use clap::Parser;
use threedbg_app::{HeadlessSurfaceFactory, StartMode, Viewer, ViewerArgs};
use threedbg_core::color::Rgb;
use threedbg_demos::{helix, lattice, spin};

const LATTICE_SIZE: usize = 6;
const SPIN_PER_STEP: f32 = 0.02;
const STEP_INTERVAL: Duration = Duration::from_millis(100);
const GRID_COLOR: Rgb = [0.4, 0.4, 0.4];

fn main() {
    let args = ViewerArgs::parse();
    threedbg_app::init_logging();
    log::info!("Orbit demo v{}", threedbg_demos::VERSION);

    let surface = HeadlessSurfaceFactory::new();
    let surface_handle = surface.handle();
    let viewer = match Viewer::start(args.config(), surface) {
        Ok(viewer) => viewer,
        Err(err) => {
            log::error!("Failed to start viewer: {}", err);
            std::process::exit(1);
        }
    };

    if args.start == StartMode::Paused {
        viewer.pause();
    }
    viewer.submit_lines("helix", &helix(3.0, 1.2, 2.0, 96), None);

    let producer = viewer.handle();
    let simulation = thread::spawn(move || {
        let cloud = lattice(LATTICE_SIZE, 0.5);
        let mut step = 0u32;
        while producer.is_running() {
            let angle = step as f32 * SPIN_PER_STEP;
            let points = producer.points();
            points.clear();
            points.add_batch(&spin(&cloud, angle));
            points.flush();

            let lines = producer.lines();
            lines.clear();
            lines
                .context()
                .axes([0.0; 3], 1.0)
                .aabb([-0.9; 3], [0.9; 3], GRID_COLOR);
            lines.flush();

            producer.barrier();
            step += 1;
        }
        log::info!("Simulation finished after {} steps", step);
    });

    match args.max_frames {
        Some(frames) => {
            if args.start == StartMode::Paused {
                // One simulation step per sampled frame.
                while surface_handle.presented_frames() < frames && viewer.is_running() {
                    viewer.step();
                    surface_handle.wait_for_frames(surface_handle.presented_frames() + 1, STEP_INTERVAL);
                }
            } else if !surface_handle.wait_for_frames(frames, Duration::from_secs(60)) {
                log::warn!("Timed out waiting for {} frames", frames);
            }
        }
        None => {
            while viewer.is_running() {
                thread::sleep(STEP_INTERVAL);
                if let Some(c) = viewer.take_char() {
                    log::info!("Key '{}'", c);
                }
            }
        }
    }

    let stats = viewer.frame_stats();
    log::info!(
        "Rendered {} frames, {:.1} fps, barrier interval {:?}",
        stats.frames,
        stats.frame_rate(),
        viewer.execution().average_interval()
    );

    if let Some(path) = &args.snapshot {
        match viewer.snapshot_image() {
            Some(image) => match image.save(path) {
                Ok(()) => log::info!("Wrote snapshot to {}", path.display()),
                Err(err) => log::error!("Failed to write snapshot {}: {}", path.display(), err),
            },
            None => log::warn!("No frame available for snapshot"),
        }
    }

    viewer.stop(true);
    if simulation.join().is_err() {
        log::error!("Simulation thread panicked");
    }
}
