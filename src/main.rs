//! Nodesmith - main entry point
//!
//! Sets the terminal up, runs the selected wizard variant, and hands the
//! validated parameters to the imaging stage. Exit statuses are part of the
//! contract with the surrounding installer scripts: 0 success, 1 internal
//! defect or imaging failure, 2 operator cancel, 3 terminal too small.

use std::fs;
use std::io::stdout;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use nodesmith::cli::{Cli, Commands};
use nodesmith::{
    check_terminal, CustomFlow, Detected, DirCatalog, DiskSource, ExpressFlow, Flow, FlowFlags,
    Imager, InstallParams, Ipv4Validator, JsonImager, KeymapSource, LocaleFlow, LocalectlKeymaps,
    Session, SysfsDiskSource, WizardCtx, WizardError, WizardKind, WizardOutcome,
};

const EXIT_FATAL: u8 = 1;
const EXIT_CANCELLED: u8 = 2;
const EXIT_TOO_SMALL: u8 = 3;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse_args();

    if let Some(Commands::Validate { params }) = &cli.command {
        return validate_params_file(params);
    }

    match run_wizard(&cli) {
        Ok(WizardOutcome::Completed) => ExitCode::SUCCESS,
        Ok(WizardOutcome::Cancelled) => {
            info!("cancelled by operator");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(err @ WizardError::TerminalTooSmall { .. }) => {
            eprintln!(
                "Terminal screen is not large enough to run the installation wizard ({err})."
            );
            eprintln!("Please resize the terminal and rerun.");
            ExitCode::from(EXIT_TOO_SMALL)
        }
        Err(err) => {
            error!(%err, "wizard failed");
            eprintln!("nodesmith: {err}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn validate_params_file(path: &Path) -> ExitCode {
    let load = || -> Result<InstallParams, String> {
        let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let params: InstallParams = serde_json::from_str(&text).map_err(|e| e.to_string())?;
        params.validate()?;
        Ok(params)
    };
    match load() {
        Ok(_) => {
            println!("Parameter file is valid: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("Parameter file rejected: {message}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run_wizard(cli: &Cli) -> nodesmith::Result<WizardOutcome> {
    let ctx = build_context(cli)?;
    let flow = build_flow(cli)?;

    check_terminal()?;
    enable_raw_mode().map_err(|e| WizardError::terminal(format!("enabling raw mode: {e}")))?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .map_err(|e| WizardError::terminal(format!("entering alternate screen: {e}")))?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| WizardError::terminal(e.to_string()))?;

    let mut session = Session::new(flow, ctx);
    let result = session.run(&mut terminal);

    // Always restore the terminal, even on failure.
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    let outcome = result?;
    if outcome == WizardOutcome::Completed {
        deliver_params(cli, &session.ctx.params)?;
    }
    Ok(outcome)
}

fn build_context(cli: &Cli) -> nodesmith::Result<WizardCtx> {
    let disks = match SysfsDiskSource::new().disks() {
        Ok(disks) => disks,
        Err(e) => {
            warn!("disk enumeration failed: {e}");
            Vec::new()
        }
    };
    let catalog = match DirCatalog::open(&cli.images_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("image catalog unavailable: {e}");
            DirCatalog::open(std::env::temp_dir())
                .map_err(|e| WizardError::external(e.to_string()))?
        }
    };
    Ok(WizardCtx {
        params: InstallParams::default(),
        flags: FlowFlags {
            network_setup: cli.network_setup,
            one_node_cluster: cli.single_node,
        },
        detected: detect_node(),
        disks,
        catalog: Rc::new(catalog),
        validator: Rc::new(Ipv4Validator),
    })
}

fn build_flow(cli: &Cli) -> nodesmith::Result<Box<dyn Flow>> {
    Ok(match cli.wizard {
        WizardKind::Express => Box::new(ExpressFlow::new()),
        WizardKind::Custom => Box::new(CustomFlow::new(load_eula(&cli.eula))),
        WizardKind::Locale => {
            let source = LocalectlKeymaps::new();
            let keymaps = source
                .keymaps()
                .map_err(|e| WizardError::external(format!("listing keymaps: {e}")))?;
            let current = source.current().unwrap_or_else(|_| "us".to_string());
            let warn_disks = match SysfsDiskSource::new().disks() {
                Ok(disks) => disks.into_iter().filter(|d| !d.is_usb).collect(),
                Err(_) => Vec::new(),
            };
            Box::new(LocaleFlow::new(keymaps, current, warn_disks))
        }
    })
}

/// Node identity facts read from DMI; absent files simply mean "not
/// detected" and the operator fills the fields in.
fn detect_node() -> Detected {
    let dmi = Path::new("/sys/class/dmi/id");
    let read = |name: &str| -> Option<String> {
        fs::read_to_string(dmi.join(name))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "None" && s != "Default string")
    };
    let detected = Detected {
        model_string: read("product_name").unwrap_or_else(|| "Unknown model".to_string()),
        node_position: None,
        block_id: read("chassis_serial"),
        node_serial: read("product_serial"),
        cluster_id: None,
    };
    info!(model = %detected.model_string, "node detection complete");
    detected
}

fn load_eula(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .flat_map(|line| nodesmith::review::wrap_line(line, 66, 0))
            .collect(),
        Err(e) => {
            warn!(path = %path.display(), "license text unavailable: {e}");
            vec![
                "License text could not be loaded from the installer media.".to_string(),
                format!("Expected at: {}", path.display()),
            ]
        }
    }
}

fn deliver_params(cli: &Cli, params: &InstallParams) -> nodesmith::Result<()> {
    if cli.print_params {
        let json = serde_json::to_string_pretty(params)?;
        println!("{json}");
        return Ok(());
    }
    JsonImager::new(&cli.out)
        .apply(params)
        .map_err(|e| WizardError::external(e.to_string()))
}
