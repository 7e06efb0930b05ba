//! paperqr: encrypted paper backups as QR code pages
//!
//! Commands:
//!   encode <input>                  - compress, encrypt and render QR page images
//!   decode <image>... -o <output>   - scan page images, decrypt and decompress
//!   config show                     - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};

use paperqr_core::config::{LogFormat, PaperConfig};
use paperqr_crypto::MIN_PASSWORD_LEN;
use paperqr_engine::{CommandBarcode, EncodeOptions};
use paperqr_pages::PageImage;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "paperqr",
    version,
    about = "Compress, encrypt and convert data into QR codes",
    long_about = "paperqr: back up small secrets on paper as password-encrypted QR code pages"
)]
struct Cli {
    /// Path to paperqr.toml configuration file
    #[arg(long, short = 'c', env = "PAPERQR_CONFIG", default_value = "paperqr.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress, encrypt and convert a file into QR code page images
    Encode {
        /// File to back up
        input: PathBuf,
        /// Directory for page images (overrides config)
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,
        /// Maximum number of pages to generate, 0 for no limit (overrides config)
        #[arg(long)]
        max_pages: Option<usize>,
        /// Overwrite existing page images
        #[arg(long)]
        force: bool,
    },

    /// Scan QR code page images, decrypt and decompress
    Decode {
        /// Page images, in any order
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Output file for the restored data
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = PaperConfig::read(&cli.config)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    init_logging(&config.log.level, config.log.format);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "paperqr starting"
    );
    if !found {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }

    match cli.command {
        Commands::Encode {
            input,
            output_dir,
            max_pages,
            force,
        } => cmd_encode(&config, &input, output_dir, max_pages, force),
        Commands::Decode {
            images,
            output,
            force,
        } => cmd_decode(&config, &images, &output, force),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── `paperqr encode` ──────────────────────────────────────────────────────────

fn cmd_encode(
    config: &PaperConfig,
    input: &Path,
    output_dir: Option<PathBuf>,
    max_pages: Option<usize>,
    force: bool,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(dir) = output_dir {
        config.output.directory = dir;
    }
    if let Some(max) = max_pages {
        config.output.max_pages = max;
    }

    // Page 1 always exists; refuse before the expensive key derivation
    if !force {
        ensure_absent(&[page_path(&config, 1)])?;
    }

    let payload = std::fs::read(input)
        .with_context(|| format!("reading input file: {}", input.display()))?;

    let password = prompt_password(true, read_password)?;

    println!("Encoding {} ({})", input.display(), fmt_bytes(payload.len()));

    let barcode = CommandBarcode::from_config(&config.barcode);
    let options = EncodeOptions::from_config(&config);
    let encoded = paperqr_engine::encode(&payload, &password, &barcode, &options)
        .with_context(|| format!("encoding {}", input.display()))?;

    let paths: Vec<PathBuf> = (1..=encoded.page_count())
        .map(|page| page_path(&config, page))
        .collect();
    if !force {
        ensure_absent(&paths)?;
    }

    std::fs::create_dir_all(&config.output.directory).with_context(|| {
        format!("creating output directory: {}", config.output.directory.display())
    })?;
    for (path, image) in paths.iter().zip(&encoded.images) {
        std::fs::write(path, image)
            .with_context(|| format!("writing page image: {}", path.display()))?;
    }
    tracing::info!(
        pages = paths.len(),
        directory = %config.output.directory.display(),
        "wrote page images"
    );

    println!();
    println!("Encode complete (verified by decoding the generated pages):");
    println!("  pages:      {}", encoded.page_count());
    println!("  input:      {}", fmt_bytes(encoded.payload_len));
    println!("  compressed: {}", fmt_bytes(encoded.compressed_len));
    println!("  encrypted:  {}", fmt_bytes(encoded.blob_len));
    for path in &paths {
        println!("  {}", path.display());
    }

    Ok(())
}

// ── `paperqr decode` ──────────────────────────────────────────────────────────

fn cmd_decode(config: &PaperConfig, images: &[PathBuf], output: &Path, force: bool) -> Result<()> {
    if !force {
        ensure_absent(std::slice::from_ref(&output.to_path_buf()))?;
    }

    let pages = images
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading page image: {}", path.display()))?;
            Ok(PageImage::new(path.display().to_string(), bytes))
        })
        .collect::<Result<Vec<_>>>()?;

    let password = prompt_password(false, read_password)?;

    println!("Decoding {} page image(s)", pages.len());

    let barcode = CommandBarcode::from_config(&config.barcode);
    let payload = paperqr_engine::decode(&pages, &password, &barcode, config.scan.workers)
        .context("decoding page images")?;

    std::fs::write(output, &payload)
        .with_context(|| format!("writing output file: {}", output.display()))?;
    tracing::info!(output = %output.display(), bytes = payload.len(), "wrote decoded payload");

    println!();
    println!("Decoded:");
    println!("  output: {}", output.display());
    println!("  bytes:  {}", fmt_bytes(payload.len()));

    Ok(())
}

// ── `paperqr config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &PaperConfig, config_path: &Path) -> Result<()> {
    println!("# paperqr configuration");
    println!("# source: {}", config_path.display());
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config")?;
    print!("{rendered}");
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Consecutive empty answers tolerated before giving up (EOF on stdin).
const MAX_EMPTY_READS: usize = 3;

/// Ask for the password until it is long enough (and, when encoding,
/// typed identically twice).
fn prompt_password<F>(with_confirm: bool, mut read: F) -> Result<SecretString>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut empty_reads = 0;
    loop {
        let password = read("Enter your password: ")?;
        if password.is_empty() {
            empty_reads += 1;
            if empty_reads >= MAX_EMPTY_READS {
                anyhow::bail!("no password entered");
            }
        } else {
            empty_reads = 0;
        }
        if password.len() < MIN_PASSWORD_LEN {
            eprintln!("\nPassword must at least have a length of {MIN_PASSWORD_LEN}. Please try again.\n");
            continue;
        }
        if with_confirm {
            let repeated = read("Repeat your password: ")?;
            if password != repeated {
                eprintln!("\nPasswords do not match. Please try again.\n");
                continue;
            }
        }
        return Ok(SecretString::from(password));
    }
}

fn read_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt).context("reading password")?;
    Ok(password.trim().to_string())
}

fn page_path(config: &PaperConfig, page: usize) -> PathBuf {
    config.output.directory.join(format!(
        "{}-{:03}.{}",
        config.output.file_prefix, page, config.barcode.image_extension
    ))
}

fn ensure_absent(paths: &[PathBuf]) -> Result<()> {
    if let Some(existing) = paths.iter().find(|p| p.exists()) {
        anyhow::bail!(
            "{} already exists: either set flag --force or choose another output",
            existing.display()
        );
    }
    Ok(())
}

fn fmt_bytes(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
