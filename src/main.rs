mod action;
mod app;
mod event;
mod logging;
mod ui;

use std::path::PathBuf;

use app::App;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use event::{Cadence, Event, EventHandler};
use hostop::config::{Config, default_hosts_path, load_config, load_config_from_path};
use hostop::host::config::DEFAULT_SSH_PORT;
use hostop::host::{ConnectionKind, HostAgent, HostConfig, HostRegistry};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "hostop",
    about = "Process monitor for the local machine and remote hosts over ssh or telnet"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host file, one `name:address:port:username:password:type` per line
    #[arg(short = 'c', long)]
    remote_config: Option<PathBuf>,

    /// Connection type for the host given on the command line
    #[arg(short = 't', long = "connexion-type", value_parser = ["ssh", "telnet"])]
    connexion_type: Option<String>,

    /// Port for the host given on the command line
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Login as `user@host`
    #[arg(short = 'l', long)]
    login: Option<String>,

    /// Address of a remote host to monitor
    #[arg(short = 's', long)]
    remote_server: Option<String>,

    #[arg(short = 'u', long)]
    username: Option<String>,

    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Keep the local host selected at startup; with --dry-run, poll every host
    #[arg(short = 'a', long, default_value_t = false)]
    all: bool,

    /// Poll once and print the result instead of starting the terminal UI
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// With --dry-run, print snapshots as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

impl Cli {
    /// The host described by `-s`/`-l` and friends, if any.
    fn ad_hoc_host(&self) -> Result<Option<HostConfig>> {
        let (login_user, login_host) = match self.login.as_deref() {
            Some(login) => match login.split_once('@') {
                Some((user, host)) => (Some(user), Some(host)),
                None => (None, Some(login)),
            },
            None => (None, None),
        };

        let Some(address) = self.remote_server.as_deref().or(login_host) else {
            if self.connexion_type.is_some()
                || self.port.is_some()
                || self.username.is_some()
                || self.password.is_some()
            {
                return Err(eyre!(
                    "connection options need a host: pass --remote-server or --login"
                ));
            }
            return Ok(None);
        };
        if address.is_empty() {
            return Err(eyre!("remote host address must not be empty"));
        }

        let username = self.username.as_deref().or(login_user).unwrap_or_default();
        let kind = ConnectionKind::from_config_str(self.connexion_type.as_deref().unwrap_or("ssh"));
        Ok(Some(HostConfig::remote(
            address,
            address,
            self.port.unwrap_or(DEFAULT_SSH_PORT),
            username,
            self.password.clone().unwrap_or_default(),
            kind,
        )))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    let log_file = cli.log_file.as_deref().or(config.general.log_file.as_deref());
    logging::init(log_file, cli.log_json)?;

    let registry = build_registry(&cli, &config)?;
    info!(hosts = registry.len(), "host registry ready");

    if cli.dry_run {
        return dry_run(&cli, &config, registry);
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &config, registry).await;

    ratatui::restore();

    result
}

fn build_registry(cli: &Cli, config: &Config) -> Result<HostRegistry> {
    let hosts_file = cli
        .remote_config
        .clone()
        .or_else(|| config.general.hosts_file.clone())
        .or_else(default_hosts_path);
    let mut registry = HostRegistry::load(hosts_file.as_deref());

    if let Some(host) = cli.ad_hoc_host()? {
        let name = host.name.clone();
        if !registry.push(host) {
            return Err(eyre!("host list is full; cannot add `{name}`"));
        }
        if !cli.all {
            registry.select(registry.len() - 1);
        }
    }
    Ok(registry)
}

fn dry_run(cli: &Cli, config: &Config, mut registry: HostRegistry) -> Result<()> {
    let mut agent = HostAgent::new(
        config.remote.connect_timeout(),
        config.remote.command_timeout(),
    );
    let targets: Vec<usize> = if cli.all {
        (0..registry.len()).collect()
    } else {
        vec![registry.current_index()]
    };

    let total = targets.len();
    let mut failed = 0usize;
    let mut reports = Vec::with_capacity(targets.len());
    for index in targets {
        registry.select(index);
        let host = registry.current();
        match agent.list(host) {
            Ok(processes) => {
                if cli.json {
                    reports.push(serde_json::json!({
                        "host": host.name,
                        "kind": host.kind.label(),
                        "processes": processes,
                    }));
                } else {
                    println!("{} ({}): {} processes", host.name, host.kind.label(), processes.len());
                }
            }
            Err(err) => {
                failed += 1;
                warn!(host = %host.name, error = %err, "dry-run poll failed");
                if cli.json {
                    reports.push(serde_json::json!({
                        "host": host.name,
                        "kind": host.kind.label(),
                        "error": err.to_string(),
                    }));
                } else {
                    eprintln!("{} ({}): {err}", host.name, host.kind.label());
                }
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    if failed > 0 {
        return Err(eyre!("{failed} of {total} hosts failed to poll"));
    }
    Ok(())
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    registry: HostRegistry,
) -> Result<()> {
    let mut app = App::new(config, registry);
    let mut events = EventHandler::new(Cadence::new(
        config.general.tick_rate(),
        config.general.poll_every_ticks,
    ));

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        if let Some(event) = events.next().await {
            let mut should_draw = false;
            match event {
                Event::Key(key) => {
                    if key.kind == crossterm::event::KeyEventKind::Press {
                        let action = app.map_key(key);
                        app.dispatch(action);
                        should_draw = true;
                    }
                }
                Event::Tick => {
                    app.on_tick();
                    should_draw = true;
                }
                Event::Poll => {
                    app.poll();
                    should_draw = true;
                }
                Event::Resize => should_draw = true,
            }
            if should_draw {
                terminal.draw(|frame| ui::draw(frame, &mut app))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hostop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn login_splits_user_and_host() {
        let host = parse(&["-l", "alice@db.internal"]).ad_hoc_host().unwrap().unwrap();
        assert_eq!(host.address, "db.internal");
        assert_eq!(host.username, "alice");
        assert_eq!(host.port, 22);
        assert_eq!(host.kind, ConnectionKind::SecureShell);
    }

    #[test]
    fn explicit_options_override_login() {
        let cli = parse(&["-l", "alice@db", "-s", "web", "-u", "bob", "-t", "telnet", "-P", "2323"]);
        let host = cli.ad_hoc_host().unwrap().unwrap();
        assert_eq!(host.address, "web");
        assert_eq!(host.username, "bob");
        assert_eq!(host.port, 2323);
        assert_eq!(host.kind, ConnectionKind::Telnet);
    }

    #[test]
    fn no_host_options_means_no_ad_hoc_host() {
        assert!(parse(&[]).ad_hoc_host().unwrap().is_none());
    }

    #[test]
    fn connection_options_without_host_are_rejected() {
        assert!(parse(&["-u", "bob"]).ad_hoc_host().is_err());
    }

    #[test]
    fn unknown_connection_type_is_rejected() {
        let argv = ["hostop", "-s", "db", "-t", "rsh"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn ad_hoc_host_is_selected_unless_all() {
        let config = Config::default();
        let missing = "/nonexistent/hostop/hosts.conf";

        let registry = build_registry(&parse(&["-c", missing, "-s", "db"]), &config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.current().address, "db");

        let registry = build_registry(&parse(&["-c", missing, "-s", "db", "-a"]), &config).unwrap();
        assert_eq!(registry.current().name, "localhost");
    }
}
