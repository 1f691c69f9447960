//! VaultGraph CLI

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use vaultgraph::{
    ClustersReport, CommunitiesReport, CommunityDetailReport, DegreesReport, DetailOptions,
    NoteContextOptions, NoteContextReport, OrphansReport, OutputFormat, Report, ReportLimits,
    Settings, VaultContextOptions, VaultContextReport, VaultRun, analyze_vault, render_timings,
};

/// VaultGraph - link graph analytics for markdown vaults
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Path to the vault directory
    #[arg(long, global = true, env = "VAULTGRAPH_VAULT")]
    vault: Option<PathBuf>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rows per report section
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Show every row
    #[arg(long, global = true)]
    all: bool,

    /// Only analyze notes matching these patterns (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    include: Vec<String>,

    /// Drop notes matching these patterns (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Skip these paths while walking the vault (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Minimum total degree to keep a note
    #[arg(long, global = true)]
    min_degree: Option<usize>,

    /// Keep only reciprocated links
    #[arg(long, global = true)]
    mutual_only: bool,

    /// Ignore links with a heading or block anchor
    #[arg(long, global = true)]
    skip_anchors: bool,

    /// Ignore embeds
    #[arg(long, global = true)]
    skip_embeds: bool,

    /// Propagate freshness across links (true or false)
    #[arg(long, global = true, value_name = "BOOL")]
    recency_cascade: Option<bool>,

    /// Print phase timings
    #[arg(long, global = true)]
    timings: bool,

    /// Output format (json, text)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Graph totals and top notes by authority, hub and degree
    #[command(alias = "stats")]
    Degrees,

    /// Every detected community
    Communities,

    /// One community by id or member note path
    Community {
        /// Community id or note path
        #[arg(value_name = "ID_OR_PATH")]
        query: String,

        /// Show member tags
        #[arg(long)]
        tags: bool,

        /// Show member neighbors
        #[arg(long)]
        neighbors: bool,
    },

    /// Mutual-link clusters
    Clusters,

    /// Notes with no links in or out
    Orphans,

    /// Graph context for specific notes
    NoteContext {
        /// Note paths (comma-separated)
        #[arg(long, required = true, value_delimiter = ',')]
        files: Vec<String>,

        #[arg(long)]
        no_tags: bool,

        #[arg(long)]
        no_neighbors: bool,

        /// Include frontmatter
        #[arg(long)]
        frontmatter: bool,

        /// Neighbors listed per direction
        #[arg(long, default_value_t = NoteContextOptions::default().neighbor_limit)]
        neighbor_limit: usize,

        /// Include typed backlinks (true or false)
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        backlinks: bool,

        /// Backlinks listed per note (0 = all)
        #[arg(long, default_value_t = NoteContextOptions::default().backlinks_limit)]
        backlinks_limit: usize,
    },

    /// Vault-wide summary
    VaultContext {
        #[arg(long, default_value_t = VaultContextOptions::default().max_communities)]
        max_communities: usize,

        #[arg(long, default_value_t = VaultContextOptions::default().top_notes)]
        community_top_notes: usize,

        #[arg(long, default_value_t = VaultContextOptions::default().top_tags)]
        community_top_tags: usize,
    },
}

impl Command {
    /// Context views are meant for tools, the rest for people
    fn default_format(&self) -> OutputFormat {
        match self {
            Command::NoteContext { .. } | Command::VaultContext { .. } => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    fn include_tags(&self) -> bool {
        match self {
            Command::Community { tags, .. } => *tags,
            Command::NoteContext { no_tags, .. } => !no_tags,
            _ => true,
        }
    }
}

impl GlobalArgs {
    /// Flags win over file and environment settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(vault) = &self.vault {
            settings.vault = Some(vault.clone());
        }
        if let Some(limit) = self.limit {
            settings.limit = limit;
        }
        if !self.include.is_empty() {
            settings.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            settings.exclude = self.exclude.clone();
        }
        if !self.ignore.is_empty() {
            settings.ignore = self.ignore.clone();
        }
        if let Some(min_degree) = self.min_degree {
            settings.min_degree = min_degree;
        }
        if self.recency_cascade.is_some() {
            settings.recency_cascade = self.recency_cascade;
        }
        settings.mutual_only |= self.mutual_only;
        settings.skip_anchors |= self.skip_anchors;
        settings.skip_embeds |= self.skip_embeds;
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let mut settings =
        Settings::load(cli.global.config.as_deref()).context("failed to load settings")?;
    cli.global.apply(&mut settings);

    let format = cli
        .global
        .format
        .unwrap_or_else(|| cli.command.default_format());
    let limits = ReportLimits {
        limit: settings.limit,
        show_all: cli.global.all,
    };

    let run = analyze_vault(&settings, cli.command.include_tags())?;
    log::info!(
        "Analyzed {} notes in {:?}",
        run.analysis.stats.node_count,
        run.analysis.timings.total
    );

    let output = render(&cli, &run, &limits, format)?;
    if format == OutputFormat::Text {
        println!("Vault: {}\n", run.root.display());
    }
    print!("{}", output);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn render(
    cli: &Cli,
    run: &VaultRun,
    limits: &ReportLimits,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let analysis = &run.analysis;
    let mut timings = cli.global.timings.then(|| analysis.timings.to_millis());

    let output = match &cli.command {
        Command::Degrees => DegreesReport::build(analysis, limits).render(format)?,
        Command::Communities => CommunitiesReport::build(analysis, limits).render(format)?,
        Command::Community {
            query,
            tags,
            neighbors,
        } => {
            let options = DetailOptions {
                include_tags: *tags,
                include_neighbors: *neighbors,
            };
            let mut report =
                CommunityDetailReport::build(analysis, query, Some(&run.root), limits, options)?;
            if let Some(timings) = timings.take() {
                report = report.with_timings(timings);
            }
            report.render(format)?
        }
        Command::Clusters => ClustersReport::build(analysis, limits).render(format)?,
        Command::Orphans => OrphansReport::build(analysis).render(format)?,
        Command::NoteContext {
            files,
            no_tags,
            no_neighbors,
            frontmatter,
            neighbor_limit,
            backlinks,
            backlinks_limit,
        } => {
            let options = NoteContextOptions {
                include_tags: !no_tags,
                include_neighbors: !no_neighbors,
                include_frontmatter: *frontmatter,
                neighbor_limit: *neighbor_limit,
                include_backlinks: *backlinks,
                backlinks_limit: *backlinks_limit,
            };
            let mut report = NoteContextReport::build(analysis, files, Some(&run.root), &options);
            if let Some(timings) = timings.take() {
                report = report.with_timings(timings);
            }
            report.render(format)?
        }
        Command::VaultContext {
            max_communities,
            community_top_notes,
            community_top_tags,
        } => {
            let options = VaultContextOptions {
                max_communities: *max_communities,
                top_notes: *community_top_notes,
                top_tags: *community_top_tags,
            };
            let mut report = VaultContextReport::build(analysis, &options);
            if let Some(timings) = timings.take() {
                report = report.with_timings(timings);
            }
            report.render(format)?
        }
    };

    // Reports without a timings field get the block on stderr
    if let Some(timings) = timings {
        eprint!("\n{}", render_timings(&timings));
    }
    Ok(output)
}
