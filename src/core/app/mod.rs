use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::models::ServerInfo;
use crate::qr::encode::render_terminal;
use crate::utils::file::OutputDir;
use crate::utils::network::{bind_ip, get_available_port_or_default};
use crate::web::routes::AppState;
use crate::web::server::WebServer;
use crate::wifi::profiles::open_store;

/// The local web interface: Encode, Decode and Wi-Fi Sharing tabs in the browser.
pub struct App {
    config: AppConfig,
    server_info: ServerInfo,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let ip = bind_ip(&config.server.host);
        let port = get_available_port_or_default(ip, config.server.port);
        let server_info = ServerInfo::new(&ip.to_string(), port);

        Self { config, server_info }
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    pub async fn run(self) -> Result<()> {
        let url = self.server_info.url();
        let output = OutputDir::new(&self.config.output.directory, &self.config.output.file_prefix);

        info!("Saving generated QR codes to: {:?}", output.root());
        info!("Web interface available at: {}", url);

        if self.config.ui.terminal_qr {
            match render_terminal(&url) {
                Ok(qr) => println!("\nScan this QR code to open qrgendec:\n{}\nOr open: {}\n", qr, url),
                Err(e) => error!("Failed to generate QR code: {}", e),
            }
        }

        if self.config.ui.open_browser {
            if let Err(e) = open::that(&url) {
                error!("Failed to open browser: {}", e);
            }
        }

        let state = AppState {
            output,
            qr_options: self.config.qr.options()?,
            server_info: self.server_info.clone(),
            wifi: open_store(self.config.wifi.backend),
        };

        let addr = SocketAddr::new(bind_ip(&self.config.server.host), self.server_info.port);
        let server = WebServer::new(addr, state, self.config.server.max_upload_size);

        let shutdown_signal = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down gracefully...");
        };

        server.run(shutdown_signal).await?;

        info!("Shutdown complete");
        Ok(())
    }
}
