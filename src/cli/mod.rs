use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::app::App;
use crate::core::config::{AppConfig, EXAMPLE_CONFIG_FILE};
use crate::core::models::DecodeReport;
use crate::qr::{decode_file, render_terminal, save_png, ErrorCorrection, QrOptions};
use crate::utils::file::{wifi_file_name, OutputDir};
use crate::wifi::{open_store, share_credentials, Security, WifiCredentials};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the local web interface (default)
    Serve(ServeArgs),

    /// Generate a QR code from text
    Encode(EncodeArgs),

    /// Decode QR codes from image files
    Decode(DecodeArgs),

    /// Share saved Wi-Fi networks as QR codes
    #[command(subcommand)]
    Wifi(WifiCommands),

    /// Generate example configuration file
    Config,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Port to listen on (will find next available port if this one is in use)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind, e.g. 0.0.0.0 to reach the interface from a phone
    #[arg(long)]
    host: Option<String>,

    /// Open web browser automatically
    #[arg(short, long)]
    open: bool,

    /// Disable the terminal QR code for the interface URL
    #[arg(long)]
    no_qr: bool,
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    /// Error correction level (L, M, Q, H)
    #[arg(long = "ec")]
    error_correction: Option<ErrorCorrection>,

    /// Pixels per module
    #[arg(long)]
    box_size: Option<u32>,

    /// Quiet zone width in modules
    #[arg(long)]
    border: Option<u32>,

    /// Print the code to the terminal instead of writing an image
    #[arg(short, long)]
    terminal: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Text to encode; read from stdin when omitted
    text: Option<String>,

    /// Image path (defaults to the next numbered file in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Image files (png, jpg, bmp, ...)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum WifiCommands {
    /// List saved Wi-Fi networks
    List,

    /// Encode a saved network's credentials as a QR code
    Share {
        /// Profile name as shown by `wifi list`
        name: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Encode credentials given on the command line
    Qr {
        #[arg(long)]
        ssid: String,

        #[arg(long)]
        password: Option<String>,

        /// wpa, wep or nopass
        #[arg(long, default_value = "wpa")]
        security: Security,

        /// Network does not broadcast its SSID
        #[arg(long)]
        hidden: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

impl RenderArgs {
    fn options(&self, config: &AppConfig) -> Result<QrOptions> {
        let mut options = config.qr.options()?;
        if let Some(level) = self.error_correction {
            options.error_correction = level;
        }
        if let Some(box_size) = self.box_size {
            options.box_size = box_size;
        }
        if let Some(border) = self.border {
            options.border = border;
        }
        Ok(options)
    }

    /// Print to the terminal or write the image, returning the written path.
    fn emit(&self, data: &str, config: &AppConfig, output: Option<&Path>) -> Result<Option<PathBuf>> {
        if self.terminal {
            println!("{}", render_terminal(data)?);
            return Ok(None);
        }

        let options = self.options(config)?;
        let path = match output {
            Some(path) => {
                save_png(data, &options, path)?;
                path.to_path_buf()
            }
            None => {
                let dir = OutputDir::new(&config.output.directory, &config.output.file_prefix);
                dir.save(data, &options)?.path
            }
        };
        Ok(Some(path))
    }
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        if let Some(Commands::Config) = self.command {
            AppConfig::save_example()?;
            println!("Generated example configuration file: {}", EXAMPLE_CONFIG_FILE);
            return Ok(());
        }

        let config = AppConfig::load().unwrap_or_else(|e| {
            info!("Using default configuration ({})", e);
            AppConfig::default()
        });

        match &self.command {
            None => serve(config, &ServeArgs::default()).await,
            Some(Commands::Serve(args)) => serve(config, args).await,
            Some(Commands::Encode(args)) => encode(&config, args),
            Some(Commands::Decode(args)) => decode(args),
            Some(Commands::Wifi(command)) => wifi(&config, command),
            Some(Commands::Config) => Ok(()),
        }
    }
}

async fn serve(mut config: AppConfig, args: &ServeArgs) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_qr {
        config.ui.terminal_qr = false;
    }
    if args.open {
        config.ui.open_browser = true;
    }

    App::new(config).run().await
}

fn encode(config: &AppConfig, args: &EncodeArgs) -> Result<()> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if text.is_empty() {
        bail!("Nothing to encode");
    }

    if let Some(path) = args.render.emit(&text, config, args.output.as_deref())? {
        println!("QR code saved to {}", path.display());
    }
    Ok(())
}

fn decode(args: &DecodeArgs) -> Result<()> {
    let mut reports = Vec::new();
    let mut found_any = false;

    for image in &args.images {
        let codes = decode_file(image).with_context(|| format!("Failed to decode {}", image.display()))?;
        let report = DecodeReport::new(codes);
        found_any |= !report.codes.is_empty();

        if !args.json {
            if args.images.len() > 1 {
                println!("{}:", image.display());
            }
            println!("{}", terminal_message(&report));
        }
        reports.push((image.display().to_string(), report));
    }

    if args.json {
        let json: Vec<_> = reports
            .into_iter()
            .map(|(path, report)| serde_json::json!({ "path": path, "report": report }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    if !found_any {
        bail!("No QR Code detected.");
    }
    Ok(())
}

/// The decode message without the clipboard lines, which only apply to the web page.
fn terminal_message(report: &DecodeReport) -> String {
    match (&report.wifi, report.codes.is_empty()) {
        (Some(creds), _) => creds.summary(),
        (None, true) => report.message.clone(),
        (None, false) => report
            .codes
            .iter()
            .map(|c| format!("Decoded QR Code: {}", c.content))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn wifi(config: &AppConfig, command: &WifiCommands) -> Result<()> {
    match command {
        WifiCommands::List => {
            let store = open_store(config.wifi.backend);
            let profiles = store.list_profiles()?;
            if profiles.is_empty() {
                warn!("No saved Wi-Fi networks found");
            }
            for name in profiles {
                println!("{}", name);
            }
            Ok(())
        }
        WifiCommands::Share { name, output, render } => {
            let store = open_store(config.wifi.backend);
            let creds = share_credentials(store.as_ref(), name)?;
            emit_wifi(config, &creds, output.as_deref(), render)
        }
        WifiCommands::Qr { ssid, password, security, hidden, output, render } => {
            let mut creds = WifiCredentials::new(ssid.clone(), *security, password.clone());
            creds.hidden = *hidden;
            creds.validate()?;
            emit_wifi(config, &creds, output.as_deref(), render)
        }
    }
}

fn emit_wifi(
    config: &AppConfig,
    creds: &WifiCredentials,
    output: Option<&Path>,
    render: &RenderArgs,
) -> Result<()> {
    let default_path;
    let output = match output {
        Some(path) => Some(path),
        None if render.terminal => None,
        None => {
            default_path = config.output.directory.join(wifi_file_name(&creds.ssid));
            Some(default_path.as_path())
        }
    };

    if let Some(path) = render.emit(&creds.to_uri(), config, output)? {
        println!("Wi-Fi QR code for {} saved to {}", creds.ssid, path.display());
    }
    Ok(())
}
