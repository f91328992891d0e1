use anyhow::Context;
use clap::Parser;
use flakeid::{BitLayout, DEFAULT_EPOCH};
use std::time::Duration;

/// Runtime configuration for the `flakeid` binary.
///
/// Every value can come from a CLI flag or an environment variable (a `.env`
/// file in the working directory is loaded first). Defaults mirror the
/// library defaults: a 5/5/12 layout anchored at [`DEFAULT_EPOCH`].
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Mint or decode time-ordered 64-bit Snowflake IDs",
    args_override_self = true
)]
pub struct CliArgs {
    /// Worker identifier encoded into every ID.
    ///
    /// Must fit in `--worker-bits`. Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0)]
    pub worker_id: u64,

    /// Datacenter identifier encoded into every ID.
    ///
    /// Must fit in `--datacenter-bits`. Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 0)]
    pub datacenter_id: u64,

    /// Width of the worker field. Environment variable: `WORKER_BITS`
    #[arg(long, env = "WORKER_BITS", default_value_t = 5)]
    pub worker_bits: u32,

    /// Width of the datacenter field. Environment variable: `DATACENTER_BITS`
    #[arg(long, env = "DATACENTER_BITS", default_value_t = 5)]
    pub datacenter_bits: u32,

    /// Width of the per-millisecond sequence. Environment variable:
    /// `SEQUENCE_BITS`
    #[arg(long, env = "SEQUENCE_BITS", default_value_t = 12)]
    pub sequence_bits: u32,

    /// Epoch subtracted from every timestamp, in milliseconds since the Unix
    /// epoch. Environment variable: `EPOCH_MILLIS`
    #[arg(long, env = "EPOCH_MILLIS", default_value_t = DEFAULT_EPOCH.as_millis() as u64)]
    pub epoch_millis: u64,

    /// Number of IDs to mint. Environment variable: `ID_COUNT`
    #[arg(short = 'n', long, env = "ID_COUNT", default_value_t = 10)]
    pub count: u64,

    /// Decode this ID instead of minting new ones.
    #[arg(long, value_name = "ID")]
    pub decode: Option<u64>,

    /// Print decoded fields as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Validated configuration. Identifier bounds are checked by
/// [`flakeid::IdGenerator::from_components`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub worker_id: u64,
    pub datacenter_id: u64,
    pub layout: BitLayout,
    pub epoch: Duration,
    pub count: u64,
    pub decode: Option<u64>,
    pub json: bool,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = BitLayout::new(args.worker_bits, args.datacenter_bits, args.sequence_bits)
            .context("WORKER_BITS + DATACENTER_BITS + SEQUENCE_BITS must fit in 63 bits")?;

        Ok(Self {
            worker_id: args.worker_id,
            datacenter_id: args.datacenter_id,
            layout,
            epoch: Duration::from_millis(args.epoch_millis),
            count: args.count,
            decode: args.decode,
            json: args.json,
        })
    }
}
