use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schemerge_core::config::Settings;
use schemerge_core::logging::init_logging;
use schemerge_core::resolve::{reconcile_record_cache, reconcile_schematic};
use schemerge_engine::{
    merge_record_caches, merge_schematic, KeywordSet, MergePolicy, MergeScenario,
    OverlapResolution,
};
use schemerge_git::{GitCli, RevisionSource};

mod route;
use route::{route_for, Route};

#[derive(Parser)]
#[command(
    name = "schemerge",
    about = "Structure-aware three-way merge for KiCad projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .schemerge data directory
    #[arg(long, default_value = ".schemerge")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-merge the files the proposed branch changed against the mainline,
    /// write the results to the working tree, and stage them
    Resolve {
        /// Mainline branch name (e.g. main)
        #[arg(long)]
        base: String,
        /// Common-ancestor revision; defaults to the merge base of
        /// origin/<base> and HEAD
        #[arg(long)]
        mergebase: Option<String>,
        /// Overlap precedence: prefer-proposed or prefer-mainline
        #[arg(long)]
        mode: Option<String>,
        /// Drop objects the proposed side deleted: true or false
        #[arg(long)]
        allow_deletions: Option<bool>,
        /// Only consider changed paths matching these globs
        globs: Vec<String>,
    },
    /// Merge three local revisions of one file
    Merge {
        /// The common-ancestor revision of the file
        #[arg(long)]
        ancestor: PathBuf,
        /// The mainline revision of the file (also selects the merge route)
        #[arg(long)]
        mainline: PathBuf,
        /// The proposed revision of the file
        #[arg(long)]
        proposed: PathBuf,
        /// Write the merged text here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Overlap precedence: prefer-proposed or prefer-mainline
        #[arg(long)]
        mode: Option<String>,
        /// Drop objects the proposed side deleted: true or false
        #[arg(long)]
        allow_deletions: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_logging(&cli.data_dir.join("logs"))?;

    let settings = match Settings::load(&cli.data_dir.join("settings.json")) {
        Ok(settings) => settings,
        Err(_) => Settings::default(),
    };

    match &cli.command {
        Commands::Resolve {
            base,
            mergebase,
            mode,
            allow_deletions,
            globs,
        } => cmd_resolve(
            &settings,
            base,
            mergebase.as_deref(),
            mode.as_deref(),
            *allow_deletions,
            globs,
        ),
        Commands::Merge {
            ancestor,
            mainline,
            proposed,
            output,
            mode,
            allow_deletions,
        } => cmd_merge(
            &settings,
            ancestor,
            mainline,
            proposed,
            output.as_deref(),
            mode.as_deref(),
            *allow_deletions,
        ),
    }
}

fn cmd_resolve(
    settings: &Settings,
    base: &str,
    mergebase: Option<&str>,
    mode: Option<&str>,
    allow_deletions: Option<bool>,
    globs: &[String],
) -> anyhow::Result<()> {
    let policy = effective_policy(settings, mode, allow_deletions)?;
    let keywords = keyword_set(settings);
    let git = GitCli::new(".");

    git.fetch_origin(base)
        .with_context(|| format!("fetching origin/{base}"))?;
    let mainline_rev = format!("origin/{base}");

    let ancestor_rev = match mergebase {
        Some(rev) => rev.to_string(),
        None => git
            .merge_base(&mainline_rev, "HEAD")
            .context("resolving merge base")?,
    };
    tracing::info!(%mainline_rev, %ancestor_rev, "resolving against mainline");

    let changed = git
        .changed_paths(&mainline_rev, "HEAD")
        .context("listing changed paths")?;
    let targets: Vec<&String> = changed
        .iter()
        .filter(|path| matches_globs(path, globs))
        .collect();

    if targets.is_empty() {
        println!("No matching changed files.");
        return Ok(());
    }

    let revisions = MergeScenario::new(ancestor_rev.as_str(), mainline_rev.as_str(), "HEAD");

    let mut staged = 0usize;
    for path in targets {
        let merged = match route_for(path, &settings.routing) {
            Route::Schematic => reconcile_schematic(&git, path, &revisions, policy, &keywords)?,
            Route::FootprintCache => reconcile_record_cache(&git, path, &revisions)?,
            Route::PassThrough => match git.read_at(path, "HEAD")? {
                Some(text) => text,
                None => {
                    tracing::debug!(%path, "no proposed content, skipping");
                    continue;
                }
            },
        };

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &merged).with_context(|| format!("writing {path}"))?;
        git.stage(path).with_context(|| format!("staging {path}"))?;
        staged += 1;
        println!("Merged & staged: {path}");
    }

    if staged == 0 {
        println!("Nothing to stage.");
    }
    Ok(())
}

fn cmd_merge(
    settings: &Settings,
    ancestor: &Path,
    mainline: &Path,
    proposed: &Path,
    output: Option<&Path>,
    mode: Option<&str>,
    allow_deletions: Option<bool>,
) -> anyhow::Result<()> {
    let policy = effective_policy(settings, mode, allow_deletions)?;
    let keywords = keyword_set(settings);

    let owned = MergeScenario::new(
        read_optional(ancestor)?,
        read_optional(mainline)?,
        read_optional(proposed)?,
    );
    let texts = owned.as_deref();

    let merged = match route_for(&mainline.to_string_lossy(), &settings.routing) {
        Route::Schematic => merge_schematic(&texts, policy, &keywords),
        Route::FootprintCache => merge_record_caches(&texts),
        Route::PassThrough => texts.proposed.map(str::to_string).ok_or_else(|| {
            anyhow::anyhow!("no proposed content to pass through: {}", proposed.display())
        })?,
    };

    match output {
        Some(path) => {
            fs::write(path, &merged).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "merged");
        }
        None => print!("{merged}"),
    }
    Ok(())
}

fn effective_policy(
    settings: &Settings,
    mode: Option<&str>,
    allow_deletions: Option<bool>,
) -> anyhow::Result<MergePolicy> {
    let mode = mode.unwrap_or(&settings.merge.mode);
    let overlap = mode
        .parse::<OverlapResolution>()
        .map_err(anyhow::Error::msg)?;
    Ok(MergePolicy {
        overlap,
        allow_deletions: allow_deletions.unwrap_or(settings.merge.allow_deletions),
    })
}

fn keyword_set(settings: &Settings) -> KeywordSet {
    KeywordSet::new(settings.merge.keywords.iter().cloned())
}

fn matches_globs(path: &str, globs: &[String]) -> bool {
    if globs.is_empty() {
        return true;
    }
    globs.iter().any(|g| match glob::Pattern::new(g) {
        Ok(pattern) => pattern.matches(path),
        Err(err) => {
            tracing::warn!(glob = %g, %err, "ignoring invalid glob");
            false
        }
    })
}

fn read_optional(path: &Path) -> anyhow::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_settings() {
        let mut settings = Settings::default();
        settings.merge.mode = "prefer-mainline".into();
        settings.merge.allow_deletions = true;

        let policy = effective_policy(&settings, None, None).unwrap();
        assert_eq!(policy.overlap, OverlapResolution::PreferMainline);
        assert!(policy.allow_deletions);

        let policy = effective_policy(&settings, Some("prefer-proposed"), Some(false)).unwrap();
        assert_eq!(policy.overlap, OverlapResolution::PreferProposed);
        assert!(!policy.allow_deletions);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let settings = Settings::default();
        assert!(effective_policy(&settings, Some("prefer-chaos"), None).is_err());
    }

    #[test]
    fn test_empty_glob_list_matches_everything() {
        assert!(matches_globs("any/path.kicad_sch", &[]));
        let globs = vec!["hw/*.kicad_sch".to_string()];
        assert!(matches_globs("hw/board.kicad_sch", &globs));
        assert!(!matches_globs("docs/readme.md", &globs));
    }
}
