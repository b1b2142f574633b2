/// waypoint: open workspace references in the IDE
///
/// Commands:
/// - serve: run the navigation daemon (default)
/// - locate: resolve a reference and print the matches
/// - autostart: register the daemon with the desktop session
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use waypoint::config::{ConfigSource, DaemonConfig};
use waypoint::locator::{ReferenceLocator, ResourceSelector, SymbolicReference};
use waypoint::resolver::selector_for;
use waypoint::server::{self, AppState};
use waypoint::startup::{self, InstanceLock};
use waypoint::window::{
    x11::REQUIRED_TOOLS, Arbiter, ArbiterTiming, CommandRunner, SystemCommandRunner, UriOpener,
    X11WindowManager, XdgOpener,
};
use waypoint::workspace::ProjectWorkspace;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Open classes and resources of a workspace in the IDE", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the navigation daemon
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Listen address, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Resolve a reference and print every match
    Locate {
        #[command(flatten)]
        config: ConfigArgs,

        /// Project name
        #[arg(short, long)]
        project: String,

        /// Fully-qualified class name
        #[arg(short, long, conflicts_with_all = ["path", "regex"])]
        class: Option<String>,

        /// Resource path or glob
        #[arg(long, conflicts_with = "regex")]
        path: Option<String>,

        /// Regex over resource paths
        #[arg(long)]
        regex: Option<String>,

        /// Search test resources first
        #[arg(long)]
        test_priority: bool,
    },

    /// Write the desktop autostart entry
    Autostart,
}

#[derive(Args)]
struct ConfigArgs {
    /// Config file (defaults to $WAYPOINT_CONFIG, then ~/.config/waypoint/waypoint.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn path(&self) -> PathBuf {
        DaemonConfig::locate(self.config.as_deref())
    }

    fn load(&self) -> Result<DaemonConfig> {
        DaemonConfig::load(&self.path())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        config: ConfigArgs { config: None },
        bind: None,
    }) {
        Commands::Serve { config, bind } => {
            // Logging depends on the config, so the load itself stays silent
            let path = config.path();
            let (mut config, source) = DaemonConfig::load_with_source(&path)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let _guards = init_daemon_logging(&config)?;
            match source {
                ConfigSource::File => info!("Configuration loaded from {}", path.display()),
                ConfigSource::Defaults => warn!(
                    "Configuration file {} not found, using defaults",
                    path.display()
                ),
            }
            serve(config)
        }
        Commands::Locate {
            config,
            project,
            class,
            path,
            regex,
            test_priority,
        } => {
            init_cli_logging();
            let config = config.load()?;
            let found = locate(&config, &project, class, path, regex, test_priority)?;
            if !found {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Autostart => {
            init_cli_logging();
            let exe = std::env::current_exe().context("Failed to resolve current executable")?;
            let path = startup::write_autostart_entry(&startup::default_autostart_dir(), &exe)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Console + daily rolling file, the guards must outlive the runtime.
fn init_daemon_logging(config: &DaemonConfig) -> Result<(WorkerGuard, WorkerGuard)> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging.level")?;

    let logs_dir = config.logging.dir_path();
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;

    let file_appender = rolling::daily(&logs_dir, "waypoint.log");
    let (non_blocking_file, file_guard) = non_blocking(file_appender);
    let (non_blocking_console, console_guard) = non_blocking(std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking_console)
                .with_target(false)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(true)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    info!("Logging to {}", logs_dir.join("waypoint.log").display());
    Ok((file_guard, console_guard))
}

/// One-shot commands: warnings to stderr unless RUST_LOG says otherwise.
fn init_cli_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn serve(config: DaemonConfig) -> Result<()> {
    info!("Starting Waypoint v{}", env!("CARGO_PKG_VERSION"));

    if config.arbiter.enabled {
        startup::check_required_tools(REQUIRED_TOOLS)?;
    }
    let lock = InstanceLock::acquire(&startup::default_lock_path())?;
    debug!("Instance lock held at {}", lock.path().display());

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    let opener: Arc<dyn UriOpener> = Arc::new(XdgOpener::new(runner.clone()));
    let arbiter = config.arbiter.enabled.then(|| {
        Arc::new(Arbiter::new(
            Arc::new(X11WindowManager::new(runner.clone())),
            opener.clone(),
            &config.ide,
            ArbiterTiming::from_config(&config.arbiter),
        ))
    });
    if arbiter.is_none() {
        info!("Window arbitration disabled, URIs are opened directly");
    }

    let state = AppState {
        locator: Arc::new(ReferenceLocator::new(&config.workspace)),
        selector: selector_for(config.selector.kind, runner),
        arbiter,
        opener,
        config: Arc::new(config),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::run(state))
}

fn locate(
    config: &DaemonConfig,
    project: &str,
    class: Option<String>,
    path: Option<String>,
    regex: Option<String>,
    test_priority: bool,
) -> Result<bool> {
    let workspace = ProjectWorkspace::resolve(project, &config.workspace)?;
    let locator = ReferenceLocator::new(&config.workspace);

    let matches = if let Some(class) = class {
        let reference = SymbolicReference::parse(&class)?;
        locator.locate_class(&reference, &workspace.root)
    } else {
        let selector = match (regex, path) {
            (Some(regex), _) => ResourceSelector::regex(&regex)?,
            (None, Some(path)) => ResourceSelector::from_path(&path)?,
            (None, None) => anyhow::bail!("one of --class, --path or --regex is required"),
        };
        locator.locate_resource(&selector, &workspace.root, test_priority)
    };

    print_matches(&workspace.root, &matches);
    Ok(!matches.is_empty())
}

fn print_matches(root: &Path, matches: &waypoint::MatchSet) {
    if matches.is_empty() {
        eprintln!("No matches under {}", root.display());
        return;
    }
    for found in matches {
        println!("{}", found.display_label());
    }
}
