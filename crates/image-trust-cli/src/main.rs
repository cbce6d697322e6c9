//! ImageTrust CLI — `imgtrust` command.
//!
//! Inspects who can sign an image tag and revokes image signatures from
//! every delegation role the caller holds keys for.

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use image_trust::confirm::prompt_for_confirmation;
use image_trust::repository::{FileRepository, TrustRepository};
use image_trust::resolve::resolve_signable_roles;
use image_trust::revoke::{revoke, RevocationRequest};
use image_trust::{ConfigOverrides, ImageReference, RoleName, TrustConfig, TrustError};

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Inspect signers and revoke trust for container images.
#[derive(Parser, Debug)]
#[command(
    name = "imgtrust",
    about = "ImageTrust CLI",
    version,
    long_about = "imgtrust — ImageTrust CLI\n\nInspect which roles can sign an image tag, and revoke signatures\nfrom every delegation role you hold keys for."
)]
struct Cli {
    /// Root of local trust data (default: $IMAGE_TRUST_DIR or ~/.image-trust)
    #[arg(long, global = true)]
    trust_dir: Option<PathBuf>,

    /// Role searched for signed tags before `targets`
    #[arg(long, global = true)]
    releases_role: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove trust for an image
    Revoke {
        /// Image reference: IMAGE[:TAG]
        image: String,

        /// Do not prompt for confirmation when revoking all tags
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the roles you can sign a tag into
    Signers {
        /// Image reference: IMAGE:TAG
        image: String,
    },

    /// List signed tags and delegation roles for an image
    Inspect {
        /// Image reference: IMAGE
        image: String,
    },

    /// Delete all local trust data for an image
    Remove {
        /// Image reference: IMAGE
        image: String,

        /// Do not prompt for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = load_config(cli.trust_dir, cli.releases_role.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Revoke { image, yes } => cmd_revoke(&config, &image, yes, verbose),
            Commands::Signers { image } => cmd_signers(&config, &image, verbose),
            Commands::Inspect { image } => cmd_inspect(&config, &image, verbose),
            Commands::Remove { image, yes } => cmd_remove(&config, &image, yes),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(trust_dir: Option<PathBuf>, releases_role: Option<&str>) -> Result<TrustConfig> {
    let releases_role = releases_role
        .map(RoleName::parse)
        .transpose()
        .context("invalid --releases-role")?;
    let config = TrustConfig::resolve(ConfigOverrides {
        trust_dir,
        releases_role,
    })
    .context("failed to load configuration")?;
    log::debug!(
        "trust dir {}, releases role {}",
        config.trust_dir.display(),
        config.releases_role
    );
    Ok(config)
}

// ── Prompt helper ─────────────────────────────────────────────────────────────

fn confirm(message: &str) -> bool {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt_for_confirmation(stdin.lock(), &mut stdout, message)
}

fn open_repository(config: &TrustConfig, reference: &ImageReference) -> Result<FileRepository> {
    FileRepository::open(&config.trust_dir, reference.name())
        .with_context(|| format!("failed to open trust data for {}", reference.name()))
}

// ── Command implementations ───────────────────────────────────────────────────

/// `imgtrust revoke IMAGE[:TAG] [--yes]`
fn cmd_revoke(config: &TrustConfig, remote: &str, yes: bool, verbose: bool) -> Result<()> {
    let reference = ImageReference::parse(remote)?;
    let request = RevocationRequest::from_reference(&reference)?
        .with_releases_role(config.releases_role.clone());

    if request.requires_confirmation() && !yes {
        let message =
            format!("Please confirm you would like to delete all signature data for {remote}?");
        if !confirm(&message) {
            println!("\nAborting action.");
            return Ok(());
        }
    }

    let mut repo = open_repository(config, &reference)?;
    let report = revoke(&mut repo, &request).map_err(|e| match e {
        TrustError::PublishFailed { .. } => anyhow!(e.to_string()),
        other => anyhow!("could not remove signature for {remote}: {other}"),
    })?;

    if verbose {
        for removed in &report.removed {
            let roles: Vec<String> =
                removed.removed_from.iter().map(ToString::to_string).collect();
            println!("  {:<20} {}", removed.name, roles.join(", "));
        }
    }
    println!("Successfully deleted signature for {remote}");

    Ok(())
}

/// `imgtrust signers IMAGE:TAG`
fn cmd_signers(config: &TrustConfig, remote: &str, verbose: bool) -> Result<()> {
    let reference = ImageReference::parse(remote)?;
    if reference.is_digested() {
        bail!("{remote}: signers are listed by tag, not digest; use IMAGE:TAG");
    }
    let Some(tag) = reference.tag() else {
        bail!("{remote} has no tag; use IMAGE:TAG");
    };
    let request = RevocationRequest::single_tag(remote, tag)
        .with_releases_role(config.releases_role.clone());

    let repo = open_repository(config, &reference)?;
    let found = repo
        .target_by_name(tag, &request.search_roles())
        .map_err(|e| anyhow!("{remote}: {e}"))?;
    let roles =
        resolve_signable_roles(&repo, &found.target).map_err(|e| anyhow!("{remote}: {e}"))?;

    println!("Signable roles for {remote}:");
    for role in &roles {
        println!("  {role}");
    }
    if verbose {
        println!();
        println!("  Found in:  {}", found.role);
        println!("  Length:    {}", found.target.length);
        if let Some(digest) = found.target.sha256_hex() {
            println!("  Digest:    sha256:{digest}");
        }
    }

    Ok(())
}

/// `imgtrust inspect IMAGE`
fn cmd_inspect(config: &TrustConfig, remote: &str, verbose: bool) -> Result<()> {
    let reference = ImageReference::parse(remote)?;
    let repo = open_repository(config, &reference)?;
    let search_roles = RevocationRequest::all_tags(remote)
        .with_releases_role(config.releases_role.clone())
        .search_roles();

    let targets = repo
        .list_targets(&search_roles)
        .map_err(|e| anyhow!("{remote}: {e}"))?;

    println!("Signed tags for {} ({}):", reference.name(), targets.len());
    if targets.is_empty() {
        println!("  (none)");
    } else {
        println!("  {:<20} {:<20} DIGEST", "TAG", "SIGNED IN");
        println!("  {}", "-".repeat(80));
        for t in &targets {
            let digest = t.target.sha256_hex().unwrap_or_else(|| "-".to_string());
            println!("  {:<20} {:<20} {}", t.target.name, t.role, digest);
        }
    }
    println!();

    let delegations = repo.delegation_roles().map_err(|e| anyhow!("{remote}: {e}"))?;
    println!("Delegations ({}):", delegations.len());
    if delegations.is_empty() {
        println!("  (none)");
    }
    for d in &delegations {
        let keys: Vec<&str> = d.key_ids.iter().map(|k| k.as_str()).collect();
        println!("  {:<30} {}", d.name, keys.join(", "));
        if verbose {
            println!("    Paths: {:?}", d.paths);
        }
    }

    if verbose {
        println!();
        println!("Last published: {}", repo.published_at().unwrap_or("never"));
    }

    Ok(())
}

/// `imgtrust remove IMAGE [--yes]`
fn cmd_remove(config: &TrustConfig, remote: &str, yes: bool) -> Result<()> {
    if !yes {
        let message =
            format!("Please confirm you would like to delete all trust data for {remote}?");
        if !confirm(&message) {
            println!("\nAborting action.");
            return Ok(());
        }
    }

    let reference = ImageReference::parse(remote)?;
    let mut repo = open_repository(config, &reference)?;
    repo.delete_trust_data()
        .map_err(|e| anyhow!("{remote}: {e}"))?;

    println!("Successfully deleted all trust data for {remote}");
    Ok(())
}
