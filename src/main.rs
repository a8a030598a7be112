use anyhow::{Context, Result};
use clap::Parser;
use dynamic_lighting::core_modules::utils::image_helper;
use dynamic_lighting::pipeline::{DEFAULT_STRENGTH, LightVectors, LightingPipeline, PipelineConfig};
use dynamic_lighting::{Vector3, decode_buffer, encode_buffer};
use std::path::PathBuf;

/// Derive a normal map from an image and relight it.
#[derive(Parser)]
#[command(version)]
struct Flags {
    /// Source image (any format the `image` crate can read).
    input: PathBuf,

    /// Normal-map strength; larger values exaggerate bumps.
    #[arg(short, long, default_value_t = DEFAULT_STRENGTH)]
    strength: f64,

    /// Light vector as X,Y,Z.
    #[arg(short, long, default_value = "0,0,1", value_parser = parse_vector, allow_hyphen_values = true)]
    light: Vector3,

    /// Eye vector as X,Y,Z.
    #[arg(short, long, default_value = "0,0,0", value_parser = parse_vector, allow_hyphen_values = true)]
    eye: Vector3,

    /// Where to write the normal map.
    #[arg(long, default_value = "normal_map.png")]
    normal_out: PathBuf,

    /// Where to write the relit image.
    #[arg(short, long, default_value = "lit.png")]
    out: PathBuf,

    /// Filter threads (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,
}

/// Parses "x,y,z", rounding each component to two decimals.
fn parse_vector(text: &str) -> Result<Vector3, String> {
    let components = text
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map(|value| (value * 100.0).round() / 100.0)
                .map_err(|err| format!("'{part}': {err}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match components.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 comma-separated components, got {}", components.len())),
    }
}

fn main() {
    env_logger::init();
    let flags = Flags::parse();

    if let Err(err) = main_result(flags) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn main_result(flags: Flags) -> Result<()> {
    log::info!("loading {}", flags.input.display());
    let raw = image_helper::load(&flags.input).with_context(|| format!("load {:?}", flags.input))?;
    let source = decode_buffer(&raw.bgra, raw.width, raw.height)?;

    let mut config = PipelineConfig {
        strength: flags.strength,
        ..PipelineConfig::default()
    };
    if let Some(threads) = flags.threads {
        config.worker_threads = threads;
    }

    let pipeline = LightingPipeline::new(source, config).context("build lighting pipeline")?;

    log::info!("writing {}", flags.normal_out.display());
    let normals = encode_buffer(pipeline.normal_map());
    image_helper::save_png(&flags.normal_out, &normals, raw.width, raw.height)
        .with_context(|| format!("save {:?}", flags.normal_out))?;

    let lit = pipeline.render(&LightVectors::new(flags.light, flags.eye))?;

    log::info!("writing {}", flags.out.display());
    image_helper::save_png(&flags.out, &encode_buffer(&lit), raw.width, raw.height)
        .with_context(|| format!("save {:?}", flags.out))?;

    Ok(())
}
