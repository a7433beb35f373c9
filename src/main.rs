//! Texel CLI - Command-line tool for preparing textures.
//!
//! This is the main entry point for the Texel command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use texel::imaging::{
    convert_rgb_to_ycocg, generate_mip_chain, multiply_alpha, resize_to_power_of_two,
    scale_rgb_to_ntsc_safe, split_cubemap,
};
use texel::prelude::*;

/// Texel - texture preparation tool
#[derive(Parser)]
#[command(name = "texel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more detail (debug level)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Transforms shared by the commands that write DDS files.
#[derive(clap::Args, Debug, Clone, Copy)]
struct PrepareArgs {
    /// Store DXT1 (no alpha) or DXT5 (alpha) blocks
    #[arg(long)]
    compress: bool,

    /// Write a full mip chain (implies --pot)
    #[arg(long)]
    mipmaps: bool,

    /// Upscale to power-of-two dimensions
    #[arg(long)]
    pot: bool,

    /// Store colors as YCoCg
    #[arg(long)]
    ycocg: bool,

    /// Scale colors into the NTSC-safe range
    #[arg(long)]
    ntsc_safe: bool,

    /// Premultiply colors by alpha
    #[arg(long)]
    premultiply: bool,

    /// Flip vertically
    #[arg(long)]
    flip: bool,

    /// Force the channel count (1-4) instead of using the file's own
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    channels: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert images to DDS
    Convert {
        /// Input images or glob patterns
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,

        /// Output DDS file, or directory when there are several inputs
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        prepare: PrepareArgs,
    },

    /// Validate a DDS file and show its layout
    Info {
        /// Input DDS file
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Split a 6:1 or 1:6 strip into a DDS cube map
    Cubemap {
        /// Input strip image
        #[arg(short, long)]
        input: PathBuf,

        /// Output DDS file
        #[arg(short, long)]
        output: PathBuf,

        /// Strip layout as six letters from NSEWUD
        #[arg(long, default_value = "EWUDNS")]
        order: FaceOrder,

        #[command(flatten)]
        prepare: PrepareArgs,
    },

    /// Decode the first surface of a DDS file to PNG
    Decompress {
        /// Input DDS file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert { input, output, prepare } => {
            cmd_convert(&input, &output, &prepare)?;
        }
        Commands::Info { input, json } => {
            cmd_info(&input, json)?;
        }
        Commands::Cubemap { input, output, order, prepare } => {
            cmd_cubemap(&input, &output, &order, &prepare)?;
        }
        Commands::Decompress { input, output } => {
            cmd_decompress(&input, &output)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_convert(patterns: &[String], output: &Path, args: &PrepareArgs) -> Result<()> {
    let inputs = expand_inputs(patterns)?;
    if inputs.is_empty() {
        bail!("No input files matched");
    }

    if inputs.len() == 1 && !output.is_dir() {
        let written = convert_file(&inputs[0], output, args)?;
        println!("Wrote {} ({} bytes)", output.display(), written);
        return Ok(());
    }

    fs::create_dir_all(output).context("Failed to create output directory")?;
    println!("Converting {} images to {}...", inputs.len(), output.display());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut converted = 0;
    let mut errors = 0;

    for input in &inputs {
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        let target = output.join(stem).with_extension("dds");

        match convert_file(input, &target, args) {
            Ok(_) => converted += 1,
            Err(e) => {
                pb.suspend(|| eprintln!("Error converting {}: {:#}", input.display(), e));
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Converted {} images in {:?} ({} errors)",
        converted,
        start.elapsed(),
        errors
    );

    Ok(())
}

fn convert_file(input: &Path, output: &Path, args: &PrepareArgs) -> Result<usize> {
    let image = decode_file(input, args)?;
    let levels = prepare_levels(image, args)?;
    let bytes = DdsWriter::new()
        .compressed(args.compress)
        .write_texture(&levels)
        .context("Failed to encode DDS")?;

    fs::write(output, &bytes).context("Failed to write output file")?;
    Ok(bytes.len())
}

fn cmd_info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let reader = DdsReader::new(&data).context("Invalid DDS file")?;
    let header = reader.header();
    let (width, height) = header.dimensions();
    let layout = reader.layout();
    let expected = layout.total_size.saturating_mul(reader.kind().face_count());
    let available = reader.data().len();
    let (flags, caps, caps2) = (header.flags, header.caps, header.caps2);

    if json {
        let info = serde_json::json!({
            "width": width,
            "height": height,
            "format": reader.format(),
            "kind": reader.kind(),
            "flags": flags,
            "caps": caps,
            "caps2": caps2,
            "levels": &layout.levels,
            "face_size": layout.total_size,
            "data_size": available,
            "complete": available >= expected,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File:       {}", input.display());
    println!("Dimensions: {}x{}", width, height);
    println!("Format:     {}", reader.format());
    println!("Kind:       {}", reader.kind());
    println!("Flags:      {:#010x}", flags);
    println!("Caps:       {:#010x} {:#010x}", caps, caps2);
    println!("Levels:     {}", layout.level_count());
    for level in &layout.levels {
        println!(
            "  {:>2}: {:>5}x{:<5} {:>10} bytes at {}",
            level.level, level.width, level.height, level.size, level.offset
        );
    }
    println!("Data:       {} of {} bytes", available, expected);
    if available < expected {
        warn!(expected, available, "file is truncated");
    }

    Ok(())
}

fn cmd_cubemap(input: &Path, output: &Path, order: &FaceOrder, args: &PrepareArgs) -> Result<()> {
    println!("Packing cube map: {} -> {}", input.display(), output.display());

    let strip = decode_file(input, args)?;
    let faces = split_cubemap(&strip, order).context("Failed to split cube map")?;
    info!(side = faces.side(), %order, "split cube map strip");

    let mut chains = Vec::with_capacity(6);
    for (face, image) in faces.into_dds_order() {
        debug!(%face, "preparing face");
        chains.push(prepare_levels(image, args)?);
    }
    let chains: [Vec<RasterImage>; 6] = chains
        .try_into()
        .map_err(|_| anyhow::anyhow!("Cube map split did not produce six faces"))?;

    let bytes = DdsWriter::new()
        .compressed(args.compress)
        .write_cubemap(&chains)
        .context("Failed to encode DDS")?;
    fs::write(output, &bytes).context("Failed to write output file")?;

    println!("Wrote {} bytes", bytes.len());
    Ok(())
}

fn cmd_decompress(input: &Path, output: &Path) -> Result<()> {
    println!("Decoding: {} -> {}", input.display(), output.display());

    let data = fs::read(input).context("Failed to read input file")?;
    let reader = DdsReader::new(&data).context("Invalid DDS file")?;
    let surface = reader
        .faces()
        .next()
        .context("DDS file has no surfaces")?
        .context("Failed to read DDS surface")?;
    let image = surface.decode_base().context("Failed to decode DDS surface")?;

    let color = match image.layout() {
        PixelLayout::Luminance => ::image::ColorType::L8,
        PixelLayout::LuminanceAlpha => ::image::ColorType::La8,
        PixelLayout::Rgb => ::image::ColorType::Rgb8,
        PixelLayout::Rgba => ::image::ColorType::Rgba8,
    };
    ::image::save_buffer_with_format(
        output,
        image.data(),
        image.width(),
        image.height(),
        color,
        ::image::ImageFormat::Png,
    )
    .context("Failed to write PNG")?;

    println!("Decoded {} surface {}x{}", surface.target, image.width(), image.height());
    Ok(())
}

fn decode_file(input: &Path, args: &PrepareArgs) -> Result<RasterImage> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let force = args
        .channels
        .map(|c| PixelLayout::from_channels(c as usize))
        .transpose()?;
    let image = ImageDecoder
        .decode(&data, force)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    debug!(
        path = %input.display(),
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "decoded input"
    );
    Ok(image)
}

/// Apply the requested transforms and build the level list to store.
fn prepare_levels(mut image: RasterImage, args: &PrepareArgs) -> Result<Vec<RasterImage>> {
    if args.flip {
        image.flip_vertical();
    }
    if args.ntsc_safe {
        scale_rgb_to_ntsc_safe(&mut image);
    }
    if args.premultiply {
        multiply_alpha(&mut image);
    }
    if args.pot || args.mipmaps {
        image = resize_to_power_of_two(image).context("Failed to resize to power of two")?;
    }
    if args.ycocg {
        convert_rgb_to_ycocg(&mut image);
    }

    let mut levels = Vec::new();
    if args.mipmaps {
        levels = generate_mip_chain(&image).context("Failed to build mip chain")?;
    }
    levels.insert(0, image);
    Ok(levels)
}

/// Expand glob patterns; plain paths are passed through as given.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            inputs.push(PathBuf::from(pattern));
            continue;
        }
        let matches = glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))?;
        for path in matches {
            inputs.push(path?);
        }
    }
    Ok(inputs)
}
