use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use sleet::{GeneratorConfig, SLEET_EPOCH, SleetId};
use std::time::Duration;

/// Runtime configuration for the `sleet` binary.
///
/// The node identifiers and epoch may come from CLI arguments, environment
/// variables, or a `.env` file in the working directory. They must match the
/// values used by the service whose IDs you are generating or decoding.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sleet",
    version,
    about = "Generate and inspect 63-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Datacenter identifier encoded into generated IDs, `[0, 31]`.
    ///
    /// Environment variable: `SLEET_DATACENTER_ID`
    #[arg(long, env = "SLEET_DATACENTER_ID", default_value_t = 0, allow_negative_numbers = true, global = true)]
    pub datacenter_id: i64,

    /// Machine identifier encoded into generated IDs, `[0, 31]`.
    ///
    /// Environment variable: `SLEET_MACHINE_ID`
    #[arg(long, env = "SLEET_MACHINE_ID", default_value_t = 0, allow_negative_numbers = true, global = true)]
    pub machine_id: i64,

    /// Epoch in milliseconds since 1970-01-01 UTC. Offsets in every ID are
    /// measured from it.
    ///
    /// Environment variable: `SLEET_EPOCH_MILLIS`
    #[arg(long, env = "SLEET_EPOCH_MILLIS", default_value_t = SLEET_EPOCH.as_millis() as u64, global = true)]
    pub epoch_millis: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue new IDs from a generator reading the system clock.
    Generate {
        /// How many IDs to issue.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Split existing IDs into their fields.
    Decode {
        /// IDs in decimal form.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub format: Format,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Command::Generate { count: 0 } = args.command {
            bail!("--count must be greater than 0");
        }

        if args.epoch_millis.checked_add(SleetId::MILLIS_MASK).is_none() {
            bail!(
                "--epoch-millis {} leaves no room for a 41-bit offset (max {})",
                args.epoch_millis,
                u64::MAX - SleetId::MILLIS_MASK
            );
        }

        let generator = GeneratorConfig::new(args.datacenter_id, args.machine_id)
            .context("invalid node identifiers")?
            .with_epoch(Duration::from_millis(args.epoch_millis));

        Ok(Self {
            generator,
            format: args.format,
            command: args.command,
        })
    }
}
