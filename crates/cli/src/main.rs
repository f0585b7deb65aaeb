//! Swivel Layout CLI

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use swivel_core::{
    build_pose, ConfigRevision, LayoutConfig, LayoutEngine, LayoutScene, RecordingKernel,
};

#[derive(Parser)]
#[command(name = "swivel-layout")]
#[command(about = "Layout and pose transforms for swivel units on a tiered platform")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pose catalog
    Poses {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Lay out every module in one pose
    Layout {
        /// Pose name (e.g., transport, load, use)
        #[arg(short, long)]
        pose: String,

        #[command(flatten)]
        source: ConfigSource,

        /// Output file for the scene (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lay out every pose of the catalog
    Catalog {
        #[command(flatten)]
        source: ConfigSource,

        /// Output file for the scenes (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the kernel requests a pose would emit, without a kernel
    Requests {
        /// Pose name
        #[arg(short, long)]
        pose: String,

        #[command(flatten)]
        source: ConfigSource,
    },

    /// Write a reference configuration
    Reference {
        /// Configuration revision (v0.3 or v0.4)
        #[arg(short, long, default_value = "v0.4", value_parser = ConfigRevision::parse)]
        revision: ConfigRevision,

        /// Output file (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ConfigSource {
    /// Configuration file (JSON); the reference configuration is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference revision (v0.3 or v0.4), ignored when a configuration file is given
    #[arg(short, long, default_value = "v0.4", value_parser = ConfigRevision::parse)]
    revision: ConfigRevision,
}

impl ConfigSource {
    fn load(&self) -> anyhow::Result<LayoutConfig> {
        match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let config = LayoutConfig::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?;
                log::info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(LayoutConfig::reference(self.revision)),
        }
    }

    fn engine(&self) -> anyhow::Result<LayoutEngine> {
        Ok(LayoutEngine::new(self.load()?)?)
    }
}

fn print_scene(scene: &LayoutScene) {
    let summary = scene.summary();
    println!(
        "Pose '{}' ({}°/{}°), revision {}",
        summary.pose, scene.pose.spin_deg, scene.pose.tilt_deg, summary.revision
    );
    println!("==========================");
    for module in &scene.modules {
        let bounds = module.posed_bounds();
        println!(
            "  {:<6} origin ({:>8.1}, {:>8.1})  footprint {:>7.1} x {:>7.1}  top {:>7.1}{}",
            module.tag,
            module.placement.origin.x,
            module.placement.origin.y,
            module.placement.footprint.x,
            module.placement.footprint.y,
            bounds.max.z,
            if module.is_clamped() { "  (clamped)" } else { "" }
        );
    }
    println!(
        "Modules: {}, clamped: {}, footprint utilization: {}",
        summary.module_count,
        summary.clamped_count,
        summary.utilization_percent()
    );
    if let Some(height) = summary.max_posed_height {
        println!("Max height: {:.1}", height);
    }
}

fn write_output(path: &Path, json: &str) -> anyhow::Result<()> {
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Saved to: {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Poses { source } => {
            let config = source.load()?;
            println!("Poses ({}):", config.revision.label());
            for pose in config.poses.poses() {
                println!(
                    "  - {:<10} spin {:>6.1}°  tilt {:>6.1}°",
                    pose.name, pose.spin_deg, pose.tilt_deg
                );
            }
        }

        Commands::Layout {
            pose,
            source,
            output,
        } => {
            let engine = source.engine()?;
            let scene = engine.compute(&pose)?;
            print_scene(&scene);

            if let Some(path) = output {
                write_output(&path, &scene.to_json()?)?;
            }
        }

        Commands::Catalog { source, output } => {
            let engine = source.engine()?;
            let scenes = engine.compute_catalog()?;
            for scene in &scenes {
                print_scene(scene);
                println!();
            }

            if let Some(path) = output {
                write_output(&path, &serde_json::to_string_pretty(&scenes)?)?;
            }
        }

        Commands::Requests { pose, source } => {
            let engine = source.engine()?;
            let mut kernel = RecordingKernel::new();
            let (scene, emitted) = build_pose(&engine, &pose, &mut kernel)?;
            log::info!(
                "Pose '{}': {} modules, {} requests",
                scene.pose.name,
                emitted.len(),
                kernel.requests().len()
            );
            println!("{}", serde_json::to_string_pretty(kernel.requests())?);
        }

        Commands::Reference { revision, output } => {
            let config = LayoutConfig::reference(revision);
            write_output(&output, &config.to_json()?)?;
        }
    }

    Ok(())
}
