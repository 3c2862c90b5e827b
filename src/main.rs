use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Mutex;

use cratedig::{
    api::AppContext,
    config,
    controller::SessionStore,
    error, info, server,
    spotify::{AccountsClient, Gateway},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the set builder web application
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Don't open the panel page in the default browser
    #[clap(long)]
    pub no_browser: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => serve(opt).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

async fn serve(opt: ServeOptions) {
    // missing secrets are a startup failure, never a runtime one
    if let Err(e) = config::ensure_required() {
        error!("Configuration incomplete: {}", e);
    }

    let gateway = match Gateway::new() {
        Ok(gateway) => gateway,
        Err(e) => error!("Failed to build HTTP client: {}", e),
    };
    let accounts = match AccountsClient::new() {
        Ok(accounts) => accounts,
        Err(e) => error!("Failed to build accounts client: {}", e),
    };

    let ctx = Arc::new(AppContext {
        store: Mutex::new(SessionStore::default()),
        gateway,
        accounts,
    });

    let page_url = format!("http://{}/", config::server_addr());
    info!("Serving the set builder on {}", page_url);
    if !opt.no_browser && webbrowser::open(&page_url).is_err() {
        info!("Open {} in your browser to get started.", page_url);
    }

    server::start_server(ctx).await;
}
