use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frametar::pack;

#[derive(Parser)]
#[command(name = "frametar", about = "Write ustar archives of image frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files into a tar archive, in the order given
    Pack {
        output: PathBuf,
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        /// Fixed modification time (seconds since the epoch) for every entry
        #[arg(long)]
        mtime: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Commands::Pack { output, files, mtime } => {
            let count = pack(&output, &files, mtime)
                .with_context(|| format!("creating {}", output.display()))?;
            println!("Created tar archive: {} ({} file(s))", output.display(), count);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pack() {
        let cli = Cli::try_parse_from(["frametar", "pack", "out.tar", "0.png", "1.png", "--mtime", "42"]).unwrap();
        let Commands::Pack { output, files, mtime } = cli.command;
        assert_eq!(output, PathBuf::from("out.tar"));
        assert_eq!(files, [PathBuf::from("0.png"), PathBuf::from("1.png")]);
        assert_eq!(mtime, Some(42));
    }

    #[test]
    fn pack_needs_inputs() {
        assert!(Cli::try_parse_from(["frametar", "pack", "out.tar"]).is_err());
    }
}
