use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use frame_atlas::{animation::Animation, PackOptions, Size, TexturePack};
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "frame-atlas", about = "Pack sprite frames into texture atlas pages")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack every image in a folder
    Folder {
        dir: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        pack: PackArgs,
    },
    /// Pack the frames of an animated GIF
    Gif {
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        pack: PackArgs,
    },
    /// Pack random rect sizes and report how well they fit
    Random {
        #[arg(long, default_value_t = 200)]
        count: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value_t = 64)]
        max_side: u32,
        #[command(flatten)]
        pack: PackArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(long, default_value = "target")]
    out: PathBuf,
    #[arg(long, default_value = "atlas")]
    name: String,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// JSON file with pack options
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    size: Option<u32>,
    #[arg(long)]
    padding: Option<u32>,
    /// Merge adjacent free rects after every placement
    #[arg(long)]
    merge_free: bool,
}

impl PackArgs {
    fn options(&self) -> anyhow::Result<PackOptions> {
        let mut options = match &self.config {
            Some(path) => PackOptions::load(path)
                .with_context(|| format!("loading pack options from {}", path.display()))?,
            None => PackOptions::default(),
        };
        if let Some(size) = self.size {
            options.size = size;
        }
        if let Some(padding) = self.padding {
            options.padding = padding;
        }
        options.merge_free |= self.merge_free;
        options.validate()?;
        Ok(options)
    }
}

fn save(pack: &TexturePack, output: &OutputArgs) -> anyhow::Result<()> {
    let written = pack
        .save(&output.out, &output.name)
        .with_context(|| format!("writing atlas to {}", output.out.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Folder { dir, output, pack } => {
            let texture_pack = TexturePack::pack_folder(&dir, pack.options()?)
                .with_context(|| format!("packing {}", dir.display()))?;
            save(&texture_pack, &output)?;
        }
        Command::Gif { file, output, pack } => {
            let animation = Animation::load_gif(&file, pack.options()?)
                .with_context(|| format!("packing {}", file.display()))?;
            log::info!(
                "{} frames, {} ms per loop",
                animation.len(),
                animation.duration_ms()
            );
            save(&animation.pack, &output)?;
        }
        Command::Random {
            count,
            seed,
            max_side,
            pack,
        } => {
            let options = pack.options()?;
            let max_side = max_side.clamp(1, options.size - options.padding * 2);
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let sizes = (0..count)
                .map(|_| Size::new(rng.gen_range(1..=max_side), rng.gen_range(1..=max_side)))
                .collect::<Vec<_>>();
            let layout = frame_atlas::pack(&sizes, &options)?;
            println!(
                "{} rects -> {} page(s) of {}x{}, {:.1}% occupancy",
                sizes.len(),
                layout.pages,
                layout.bin.width,
                layout.bin.height,
                layout.occupancy() * 100.0
            );
        }
    }
    Ok(())
}
