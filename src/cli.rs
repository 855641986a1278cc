use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the citation impact graph from Semantic Scholar
    Graph,
    /// Generate the publication list and citation diet from the Zotero library
    Pubs {
        /// Print a summary instead of writing any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the canonical form of one or more venue names
    Normalize {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_working_directory() {
        let cli = Cli::try_parse_from(["venuegraph", "graph"]).expect("parse");
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(matches!(cli.command, Command::Graph));
    }

    #[test]
    fn config_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["venuegraph", "pubs", "--dry-run", "-c", "site/config.toml"])
            .expect("parse");
        assert_eq!(cli.config, PathBuf::from("site/config.toml"));
        assert!(matches!(cli.command, Command::Pubs { dry_run: true }));
    }

    #[test]
    fn normalize_requires_a_name() {
        assert!(Cli::try_parse_from(["venuegraph", "normalize"]).is_err());
    }

    #[test]
    fn normalize_keeps_names_verbatim() {
        proptest::proptest!(|(name in "[A-Za-z0-9 '()]{1,40}")| {
            proptest::prop_assume!(!name.trim().is_empty());
            let cli = Cli::try_parse_from(["venuegraph", "normalize", name.as_str()]).expect("parse");
            match cli.command {
                Command::Normalize { names } => proptest::prop_assert_eq!(names, vec![name.clone()]),
                _ => proptest::prop_assert!(false, "expected normalize"),
            }
        })
    }
}
