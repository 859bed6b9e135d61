//! Releve CLI - per-entity transaction statements as PDF
//!
//! ```bash
//! releve hub                                        # List the generators
//! releve launch agents -- --input export.xlsx       # Start one as a separate process
//! releve generate --variant centres --input export.xlsx
//! releve inspect --variant merchants --input export.xlsx --json
//! releve save Rapports_Multi_Centres_20250701_093000.zip ~/Documents/
//! releve logos --left bpm.png --right bankily.png   # Remember logos and output dir
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use releve::{driver, launcher, RunContext, RunEvent, RunStatus, Settings};
use releve_core::{ReportVariant, VariantKind};
use releve_pdf::TypstRenderer;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "releve")]
#[command(about = "Split transaction exports into per-entity PDF statements", long_about = None)]
struct Cli {
    /// Settings file (default: platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one statement per group and package them as a zip archive
    Generate {
        /// centres, merchants or agents
        #[arg(short, long)]
        variant: VariantKind,

        /// Input spreadsheet (.xlsx, .xls, .xlsb, .ods)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the archive (default: saved setting or current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// TOML file overriding fields of the variant preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        logo_left: Option<PathBuf>,

        #[arg(long)]
        logo_right: Option<PathBuf>,
    },

    /// List the groups that would be generated, with counts and totals
    Inspect {
        #[arg(short, long)]
        variant: VariantKind,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the available generators
    Hub,

    /// Start a generator as an independent process
    Launch {
        variant: VariantKind,

        /// Arguments forwarded to `generate`
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Copy a finished archive to another location
    Save {
        archive: PathBuf,
        destination: PathBuf,
    },

    /// Show or change the saved logos and output directory
    Logos {
        #[arg(long)]
        left: Option<PathBuf>,

        #[arg(long)]
        right: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Forget every saved path
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Erreur : {e:#}");
        std::process::exit(1);
    }
}

/// Resolved and read only by the subcommands that use saved settings.
fn load_settings(explicit: Option<&Path>) -> anyhow::Result<(PathBuf, Settings)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok((path, settings))
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let explicit = cli.settings.as_deref();
    let cwd = std::env::current_dir().context("resolving current directory")?;

    match cli.command {
        Commands::Generate {
            variant,
            input,
            output_dir,
            config,
            logo_left,
            logo_right,
        } => {
            let (_, settings) = load_settings(explicit)?;
            let mut branding = settings.branding(&cwd);
            if logo_left.is_some() {
                branding.left_logo = logo_left;
            }
            if logo_right.is_some() {
                branding.right_logo = logo_right;
            }
            let ctx = RunContext {
                input,
                variant: load_variant(variant, config.as_deref())?,
                output_dir: output_dir.unwrap_or_else(|| settings.output_dir(&cwd)),
                branding,
                started_at: chrono::Local::now().naive_local(),
            };
            cmd_generate(ctx).await
        }

        Commands::Inspect { variant, input, config, json } => {
            cmd_inspect(&input, &load_variant(variant, config.as_deref())?, json)
        }

        Commands::Hub => {
            cmd_hub();
            Ok(())
        }

        Commands::Launch { variant, args } => {
            let (_, settings) = load_settings(explicit)?;
            let pid = match &settings.scrubbed_env_prefixes {
                Some(prefixes) => launcher::launch(variant, &args, prefixes.as_slice())?,
                None => launcher::launch(variant, &args, launcher::DEFAULT_SCRUBBED_PREFIXES)?,
            };
            println!("Générateur {variant} lancé (pid {pid})");
            Ok(())
        }

        Commands::Save { archive, destination } => {
            let saved = releve_storage::save_archive(&archive, &destination)
                .with_context(|| format!("saving {}", archive.display()))?;
            println!("Sauvegardé : {}", saved.display());
            Ok(())
        }

        Commands::Logos { left, right, output_dir, reset } => {
            let (settings_path, settings) = load_settings(explicit)?;
            let mut updated = if reset { Settings::default() } else { settings };
            let changed = reset || left.is_some() || right.is_some() || output_dir.is_some();
            if left.is_some() {
                updated.left_logo = left;
            }
            if right.is_some() {
                updated.right_logo = right;
            }
            if output_dir.is_some() {
                updated.output_dir = output_dir;
            }
            if changed {
                updated.save(&settings_path)?;
            }
            let branding = updated.branding(&cwd);
            let show = |label: &str, path: &Option<PathBuf>| match path {
                Some(p) if p.is_file() => println!("{label} : {}", p.display()),
                Some(p) => println!("{label} : {} (introuvable)", p.display()),
                None => println!("{label} : -"),
            };
            show("Logo gauche", &branding.left_logo);
            show("Logo droit", &branding.right_logo);
            println!("Dossier de sortie : {}", updated.output_dir(&cwd).display());
            Ok(())
        }
    }
}

fn load_variant(kind: VariantKind, config: Option<&Path>) -> anyhow::Result<ReportVariant> {
    let preset = ReportVariant::preset(kind);
    match config {
        None => Ok(preset),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ReportVariant::from_toml(preset, &text)
                .with_context(|| format!("applying {}", path.display()))
        }
    }
}

async fn cmd_generate(ctx: RunContext) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<RunEvent>();

    let worker = tokio::task::spawn_blocking(move || {
        let renderer = TypstRenderer::new();
        driver::run(&ctx, &renderer, Some(&tx))
    });

    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Started { rows, groups } => {
                println!("{rows} transactions, {groups} groupes");
            }
            RunEvent::GroupDone { index, total, key, ok } => {
                let mark = if ok { "ok" } else { "ÉCHEC" };
                println!("[{index}/{total}] {key} : {mark}");
            }
            RunEvent::Archived { path } => {
                println!("Archive : {}", path.display());
            }
        }
    }

    let outcome = worker.await.context("generation worker stopped")??;
    for failure in &outcome.failures {
        eprintln!("{} : {}", failure.key, failure.error);
    }
    match outcome.status {
        RunStatus::Archived(_) => {
            println!(
                "{} document(s) générés, {} échec(s)",
                outcome.generated,
                outcome.failures.len()
            );
            Ok(())
        }
        RunStatus::NothingGenerated => bail!("aucun document généré"),
    }
}

fn cmd_inspect(input: &Path, variant: &ReportVariant, json: bool) -> anyhow::Result<()> {
    let summaries = driver::inspect(input, variant, chrono::Local::now().naive_local())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    println!("{} groupe(s) détecté(s) dans la colonne {}", summaries.len(), variant.key_column);
    for s in &summaries {
        let flag = if s.period.substituted { " *" } else { "" };
        println!(
            "  {:<30} {:>6} trs  {:>16} {}  {}{}",
            s.key,
            s.count,
            s.amount_sum.format(variant.total_decimals),
            variant.currency,
            s.period,
            flag
        );
    }
    Ok(())
}

fn cmd_hub() {
    println!("BANKILY - Centre de génération de rapports PDF\n");
    for card in &launcher::CARDS {
        println!("{} ({})", card.title, card.kind);
        println!("  {}", card.description);
        println!("  Colonne requise : {}", card.required_column());
        for detail in card.details {
            println!("  - {detail}");
        }
        println!();
    }
    println!("Lancer : releve launch <variante> -- --input <fichier>");
}
