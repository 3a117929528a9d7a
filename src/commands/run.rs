use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use interact::{Interactivity, Options};
use page::{Page, PageOptions, ReadyState};
use tracing::info;

use crate::report::Report;
use crate::scenario::Scenario;

#[derive(Args)]
pub struct RunArgs {
    /// HTML page to load
    pub page: PathBuf,

    /// Options file (see `glint config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scenario file with the interactions to replay
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Install while the document is still loading
    #[arg(long)]
    pub loading: bool,
}

fn read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} {}", path.display()))
}

/// Load, install, replay and report.
pub fn execute(args: &RunArgs) -> Result<Report> {
    let source = read(&args.page, "page")?;
    let options = match &args.config {
        Some(path) => Options::from_toml_str(&read(path, "options")?)
            .with_context(|| format!("Invalid options in {}", path.display()))?,
        None => Options::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_toml_str(&read(path, "scenario")?)
            .with_context(|| format!("Invalid scenario in {}", path.display()))?,
        None => Scenario::default(),
    };

    let loading = args.loading || scenario.loading;
    let mut page = Page::from_html(
        &source,
        PageOptions {
            viewport: scenario.viewport.map(Into::into).unwrap_or_default(),
            ready_state: if loading { ReadyState::Loading } else { ReadyState::Complete },
            ..PageOptions::default()
        },
    )
    .with_context(|| format!("Failed to load {}", args.page.display()))?;

    let interactivity = Interactivity::new(options);
    interactivity.install(&mut page)?;
    if loading {
        page.set_ready_state(ReadyState::Interactive);
    }

    scenario.run(&mut page)?;
    page.settle();
    info!(steps = scenario.steps.len(), "scenario finished");

    Ok(Report::collect(&page, interactivity.options()))
}

pub fn run(args: &RunArgs) -> Result<()> {
    let report = execute(args)?;
    print!("{report}");
    Ok(())
}
