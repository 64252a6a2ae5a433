use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filecrypt::{config, FileCryptError, FileEncryptionService};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use zeroize::Zeroizing;

/// Environment variable that supplies the passphrase non-interactively
const ENV_PASSPHRASE: &str = "FILECRYPT_PASSPHRASE";

/// filecrypt - Encrypt files and folders with a passphrase (AES-128-CBC)
#[derive(Parser)]
#[command(name = "filecrypt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to $FILECRYPT_CONFIG, then ./filecrypt.json)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration file with default settings
    Init {
        /// Default extension filter for folder encryption
        #[arg(short, long, default_value = "")]
        ext: String,

        /// Default output directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Only process the top level of folders by default
        #[arg(long)]
        no_recursive: bool,
    },

    /// Encrypt a single file into <output>/<name>.enc
    EncryptFile {
        /// File to encrypt
        input: PathBuf,

        /// Output directory (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip overwrite confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Decrypt a single file, stripping its last extension
    DecryptFile {
        /// Encrypted file
        input: PathBuf,

        /// Output directory (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip overwrite confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Encrypt every file in a folder whose name ends with the extension filter
    EncryptFolder {
        /// Folder to encrypt
        source_dir: PathBuf,

        /// Output directory (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File name suffix filter, e.g. "txt" (defaults to extension_filter from config)
        #[arg(short, long)]
        ext: Option<String>,

        /// Do not descend into subdirectories
        #[arg(long)]
        no_recursive: bool,

        /// Skip overwrite confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Decrypt every file in a folder
    DecryptFolder {
        /// Folder holding encrypted files
        source_dir: PathBuf,

        /// Output directory (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not descend into subdirectories
        #[arg(long)]
        no_recursive: bool,

        /// Skip overwrite confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging
    // Use RUST_LOG environment variable to control log level (e.g., RUST_LOG=info,filecrypt=debug)
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    info!(command = ?cli.command, "filecrypt starting");

    let result = match cli.command {
        Commands::Init {
            ext,
            output_dir,
            no_recursive,
        } => {
            let config_path = cli
                .config
                .clone()
                .or_else(|| env::var(config::ENV_CONFIG_PATH).ok())
                .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
            cmd_init(&config_path, ext, output_dir, !no_recursive).await
        }

        Commands::EncryptFile { input, output, yes } => {
            cmd_encrypt_file(cli.config.as_deref(), &input, output, yes).await
        }

        Commands::DecryptFile { input, output, yes } => {
            cmd_decrypt_file(cli.config.as_deref(), &input, output, yes).await
        }

        Commands::EncryptFolder {
            source_dir,
            output,
            ext,
            no_recursive,
            yes,
        } => cmd_encrypt_folder(cli.config.as_deref(), &source_dir, output, ext, no_recursive, yes).await,

        Commands::DecryptFolder {
            source_dir,
            output,
            no_recursive,
            yes,
        } => cmd_decrypt_folder(cli.config.as_deref(), &source_dir, output, no_recursive, yes).await,
    };

    if let Err(e) = &result {
        if let Some(FileCryptError::KeyMismatch) = e.downcast_ref::<FileCryptError>() {
            eprintln!("Passphrase is incorrect. Please try again.");
        }
    }
    result
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Passphrase from the environment, or prompted without echo.
/// With `confirm`, the prompt is repeated and both entries must match.
fn read_passphrase(confirm: bool) -> Result<Zeroizing<String>> {
    if let Ok(passphrase) = env::var(ENV_PASSPHRASE) {
        info!("using passphrase from environment");
        return Ok(Zeroizing::new(passphrase));
    }

    let passphrase = Zeroizing::new(
        rpassword::prompt_password("Passphrase: ").context("reading passphrase")?,
    );
    if confirm {
        let again = Zeroizing::new(
            rpassword::prompt_password("Repeat passphrase: ").context("reading passphrase")?,
        );
        if *passphrase != *again {
            anyhow::bail!("passphrases do not match");
        }
    }
    if passphrase.is_empty() {
        warn!("empty passphrase");
    }
    Ok(passphrase)
}

/// Ask before writing into a directory where files may be replaced
fn confirm_overwrite(output_dir: &Path, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    print!(
        "Files in '{}' may be overwritten. Continue? [y/N]: ",
        output_dir.display()
    );
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;

    if !response.trim().eq_ignore_ascii_case("y") {
        println!("Cancelled.");
        return Ok(false);
    }
    Ok(true)
}

fn resolve_output_dir(output: Option<PathBuf>, cfg: &config::Config) -> Result<PathBuf> {
    output
        .or_else(|| cfg.output_dir.as_ref().map(PathBuf::from))
        .context("no output directory given (use --output or set output_dir in the config file)")
}

/// Write a configuration file
async fn cmd_init(
    config_path: &str,
    ext: String,
    output_dir: Option<String>,
    recursive: bool,
) -> Result<()> {
    if fs::try_exists(config_path).await.unwrap_or(false) {
        anyhow::bail!(
            "Configuration file '{}' already exists. Remove it first or use a different path.",
            config_path
        );
    }

    let mut cfg = config::Config::new(ext, recursive);
    cfg.output_dir = output_dir;
    cfg.validate()?;

    let config_json = serde_json::to_string_pretty(&cfg)?;
    fs::write(config_path, config_json)
        .await
        .with_context(|| format!("writing config to '{}'", config_path))?;

    println!("Configuration written to {}", config_path);
    println!("  Extension filter: {:?}", cfg.extension_filter);
    println!("  Recursive:        {}", cfg.recursive);
    match &cfg.output_dir {
        Some(dir) => println!("  Output dir:       {}", dir),
        None => println!("  Output dir:       (none, pass --output)"),
    }
    Ok(())
}

async fn cmd_encrypt_file(
    config_path: Option<&str>,
    input: &Path,
    output: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let cfg = config::Config::load_with_env(config_path)?;
    let output_dir = resolve_output_dir(output, &cfg)?;
    if !confirm_overwrite(&output_dir, yes)? {
        return Ok(());
    }
    let passphrase = read_passphrase(true)?;

    let spinner = create_spinner(&format!("Encrypting {}...", input.display()));
    let result = FileEncryptionService::aes()
        .encrypt_file(input, &output_dir, &passphrase)
        .await;
    match result {
        Ok(written) => {
            spinner.finish_with_message(format!(
                "Encrypted {} -> {}",
                input.display(),
                written.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e).with_context(|| format!("encrypting {}", input.display()))
        }
    }
}

async fn cmd_decrypt_file(
    config_path: Option<&str>,
    input: &Path,
    output: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let cfg = config::Config::load_with_env(config_path)?;
    let output_dir = resolve_output_dir(output, &cfg)?;
    if !confirm_overwrite(&output_dir, yes)? {
        return Ok(());
    }
    let passphrase = read_passphrase(false)?;

    let spinner = create_spinner(&format!("Decrypting {}...", input.display()));
    let result = FileEncryptionService::aes()
        .decrypt_file(input, &output_dir, &passphrase)
        .await;
    match result {
        Ok(written) => {
            spinner.finish_with_message(format!(
                "Decrypted {} -> {}",
                input.display(),
                written.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e).with_context(|| format!("decrypting {}", input.display()))
        }
    }
}

async fn cmd_encrypt_folder(
    config_path: Option<&str>,
    source_dir: &Path,
    output: Option<PathBuf>,
    ext: Option<String>,
    no_recursive: bool,
    yes: bool,
) -> Result<()> {
    let cfg = config::Config::load_with_env(config_path)?;
    let output_dir = resolve_output_dir(output, &cfg)?;
    let filter = ext.unwrap_or_else(|| cfg.extension_filter.clone());
    if !confirm_overwrite(&output_dir, yes)? {
        return Ok(());
    }
    let passphrase = read_passphrase(true)?;

    let service = FileEncryptionService::aes().with_recursion(cfg.recursive && !no_recursive);
    let spinner = create_spinner(&format!("Encrypting {}...", source_dir.display()));
    let result = service
        .encrypt_folder(source_dir, &output_dir, &filter, &passphrase)
        .await;
    match result {
        Ok(written) => {
            spinner.finish_with_message(format!(
                "Encrypted {} file(s) -> {}",
                written.len(),
                output_dir.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e).with_context(|| format!("encrypting folder {}", source_dir.display()))
        }
    }
}

async fn cmd_decrypt_folder(
    config_path: Option<&str>,
    source_dir: &Path,
    output: Option<PathBuf>,
    no_recursive: bool,
    yes: bool,
) -> Result<()> {
    let cfg = config::Config::load_with_env(config_path)?;
    let output_dir = resolve_output_dir(output, &cfg)?;
    if !confirm_overwrite(&output_dir, yes)? {
        return Ok(());
    }
    let passphrase = read_passphrase(false)?;

    let service = FileEncryptionService::aes().with_recursion(cfg.recursive && !no_recursive);
    let spinner = create_spinner(&format!("Decrypting {}...", source_dir.display()));
    let result = service
        .decrypt_folder(source_dir, &output_dir, &passphrase)
        .await;
    match result {
        Ok(written) => {
            spinner.finish_with_message(format!(
                "Decrypted {} file(s) -> {}",
                written.len(),
                output_dir.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e).with_context(|| format!("decrypting folder {}", source_dir.display()))
        }
    }
}
