use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use interact::Options;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write options to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save the default options as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = Options::default().to_toml_string()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write options to {}", path.display()))?;
        println!("Default options saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_options_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        run(&ConfigArgs { output: Some(path.clone()) }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(Options::from_toml_str(&text).unwrap(), Options::default());
    }
}
