use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use nessfix_backend::config::{self, DEFAULT_CONFIG_PATH};
use nessfix_backend::logging::init_logging;
use nessfix_backend::module::league::{page_source, LeagueUpdater, PageSource, StaticPage};
use nessfix_backend::module::renderer::CardLayoutKind;

const USAGE: &str = "\
Usage: nessfix <scrape|build|all> [options]

Commands:
  scrape              fetch the league page and write the JSON snapshot
  build               render index.html, nessfix.svg and nessfix.png from the snapshot
  all                 scrape, then build

Options:
  --config <path>     configuration file (default: config.toml)
  --wide              use the wide card layout
  --page-file <path>  parse a saved league page instead of fetching it
  -h, --help          show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Scrape,
    Build,
    All,
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    command: Command,
    config_path: PathBuf,
    wide: bool,
    page_file: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Invocation>> {
    let mut command = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut wide = false;
    let mut page_file = None;

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "scrape" => command = Some(Command::Scrape),
            "build" => command = Some(Command::Build),
            "all" => command = Some(Command::All),
            "--config" => {
                config_path = PathBuf::from(args.next().context("Missing value for --config")?);
            }
            "--wide" => wide = true,
            "--page-file" => {
                page_file = Some(PathBuf::from(args.next().context("Missing value for --page-file")?));
            }
            "-h" | "--help" => return Ok(None),
            other => bail!("Unknown arg: {}\n\n{}", other, USAGE),
        }
    }

    let Some(command) = command else {
        bail!("Missing command\n\n{}", USAGE);
    };
    Ok(Some(Invocation {
        command,
        config_path,
        wide,
        page_file,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(invocation) = parse_args(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = config::read_config(&invocation.config_path)?;
    let _logging_guard = init_logging(&config.log_dir, "nessfix", &config.log_level, false)?;
    if let Some(notice) = config::missing_config_notice(&invocation.config_path) {
        tracing::warn!("{}", notice);
    }

    let layout = if invocation.wide {
        CardLayoutKind::Wide
    } else {
        config.card.layout
    };
    let updater = LeagueUpdater::new(config);
    let snapshot_path = config.output.snapshot_path();

    let model = match invocation.command {
        Command::Scrape | Command::All => {
            let source: Box<dyn PageSource> = match &invocation.page_file {
                Some(path) => Box::new(
                    StaticPage::from_file(path).with_context(|| format!("Failed to read page file {:?}", path))?,
                ),
                None => page_source(&config.source).context("Failed to set up the page fetcher")?,
            };
            let model = updater.scrape(source.as_ref()).await.context("Scrape failed")?;
            updater
                .save_snapshot(&snapshot_path, &model)
                .await
                .with_context(|| format!("Failed to write snapshot {:?}", snapshot_path))?;
            tracing::info!(
                "Scraped {} standings rows and {} fixtures",
                model.standings.len(),
                model.fixtures.len()
            );
            if invocation.command == Command::Scrape {
                return Ok(());
            }
            // rebuild from the snapshot so both paths render the same tidied model
            updater.load_snapshot(&snapshot_path).await?
        }
        Command::Build => updater.load_snapshot(&snapshot_path).await.context("Build failed")?,
    };

    let artifacts = updater
        .build_artifacts(&model, layout)
        .await
        .context("Failed to build artifacts")?;
    tracing::info!(
        "Built {:?}, {:?}{}",
        artifacts.page,
        artifacts.svg,
        artifacts
            .png
            .as_ref()
            .map(|p| format!(" and {:?}", p))
            .unwrap_or_else(|| " (PNG skipped)".to_string())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let inv = parse_args(args(&["all", "--config", "alt.toml", "--wide"])).unwrap().unwrap();
        assert_eq!(inv.command, Command::All);
        assert_eq!(inv.config_path, PathBuf::from("alt.toml"));
        assert!(inv.wide);
        assert_eq!(inv.page_file, None);

        let inv = parse_args(args(&["build"])).unwrap().unwrap();
        assert_eq!(inv.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!inv.wide);
    }

    #[test]
    fn test_parse_args_errors_and_help() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["build", "--config"])).is_err());
        assert!(parse_args(args(&["publish"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }
}
