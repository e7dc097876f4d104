use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "ftl-remix",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate an FTL Slipstream mod from the 744 Music FTL Remix Project album",
    long_about = "Generate an FTL mod that replaces the in-game soundtrack with the remixed \
                  versions by 744 Music. The tracks are not included: get the album (.ogg \
                  version) from https://744music.bandcamp.com/album/ftl-remix-project and pass \
                  the downloaded zip. The .ftl mod is written next to the album unless \
                  --output is given."
)]
pub struct App {
    /// Album archive (.zip)
    pub input: PathBuf,

    /// Where to write the mod
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML file overriding the built-in settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store tracks without recompressing them
    #[arg(long)]
    pub stored: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("File {} is not a zip archive", .0.display())]
pub struct NotAZip(pub PathBuf);

/// The album must be a `.zip`; anything else is rejected before the engine runs.
pub fn validate_input(path: &Path) -> Result<(), NotAZip> {
    if path.to_string_lossy().ends_with(".zip") {
        Ok(())
    } else {
        Err(NotAZip(path.to_path_buf()))
    }
}
