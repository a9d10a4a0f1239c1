use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use footmouse_lib::{
    ButtonMode, DeviceConfig, Endpoint, FootMouse, KeyCombo, Response, SerialPortTransport, Transport,
};
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Configure a footmouse pedal over its serial port")]
struct Cli {
    /// Serial port to use instead of probing every port
    #[arg(short, long, global = true)]
    port: Option<String>,
    /// Talk to older 9600 baud, delimiter-framed firmware
    #[arg(long, global = true)]
    legacy: bool,
    /// Override the protocol's baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,
    /// Response read window in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List serial ports on this machine
    List,
    /// Find the pedal and check that it identifies itself
    Identify,
    /// Send text and print whatever comes back
    Echo { text: String },
    /// Assign a mouse or keyboard behaviour to a pedal
    Mode {
        button: u8,
        /// Name (left, double, control-click, ...) or number
        mode: ButtonMode,
        /// Engage on lifting the foot instead of pressing
        #[arg(long)]
        inverted: bool,
    },
    /// Program a key combo such as ctrl+shift+t
    Combo {
        button: u8,
        combo: KeyCombo,
        #[arg(long)]
        inverted: bool,
    },
    /// Type ASCII text through the pedal's keyboard
    Type { text: String },
    /// Store ASCII text on the pedal
    Store { text: String },
    /// Type the text stored on the pedal
    Replay,
    /// Restore every pedal's default behaviour
    Reset,
}

fn setup_logging(verbosity: &Verbosity<InfoLevel>) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry().with(filter).with(console_layer).init();
}

fn build_config(cli: &Cli) -> DeviceConfig {
    let mut config = if cli.legacy {
        DeviceConfig::legacy()
    } else {
        DeviceConfig::structured()
    };
    if let Some(baud) = cli.baud {
        config = config.with_baud_rate(baud);
    }
    if let Some(ms) = cli.timeout_ms {
        let window = Duration::from_millis(ms);
        config = config.with_read_timeout(window).with_probe_timeout(window);
    }
    info!("Using {} protocol at {} baud", config.protocol, config.baud_rate);
    config
}

fn print_response(response: &Response) {
    match response {
        Response::Sent => println!("sent"),
        Response::NoResponse => println!("no response"),
        Response::Lines(_) => print!("{}", response.text()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
    Ok(())
}

fn list_ports() -> Result<()> {
    let ports = SerialPortTransport
        .list_endpoints()
        .context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        info!("No serial ports found.");
    }
    for port in ports {
        println!("{}", port);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli);
    let mouse = FootMouse::new(config);
    if let Some(port) = &cli.port {
        mouse.locator().pin(Endpoint::new(port.as_str())).await;
    }

    let response = match cli.command {
        Action::List => return list_ports(),
        Action::Identify => {
            let endpoint = mouse.locator().endpoint().await?;
            if mouse.identify().await? {
                println!("footmouse on {}", endpoint);
                return Ok(());
            }
            anyhow::bail!("{} did not identify as a footmouse", endpoint);
        }
        Action::Echo { text } => mouse.echo(&text).await?,
        Action::Mode { button, mode, inverted } => mouse.set_button_mode(button, mode, inverted).await?,
        Action::Combo { button, combo, inverted } => mouse.set_button_keycombo(button, combo, inverted).await?,
        Action::Type { text } => mouse.type_text(&text).await?,
        Action::Store { text } => mouse.set_stored_string(&text).await?,
        Action::Replay => mouse.type_stored_string().await?,
        Action::Reset => mouse.reset_buttons().await?,
    };

    print_response(&response);
    Ok(())
}
