use clap::Args;
use curvelab_core::pool::{derive_pool_settings, render_solidity};
use curvelab_core::{CurveLabConfig, PoolConfig};

use super::{print_json, OutputFormat};

/// Every flag overrides the matching `[pool]` config value.
#[derive(Args, Debug)]
pub struct PoolArgs {
    /// Tick spacing of the pool
    #[arg(long)]
    pub tick_spacing: Option<i32>,

    /// Lower tick of the primary position
    #[arg(long, allow_negative_numbers = true)]
    pub tick_lower: Option<i32>,

    /// Upper tick of the primary position
    #[arg(long, allow_negative_numbers = true)]
    pub tick_upper: Option<i32>,

    /// Graduation price in wei per token
    #[arg(long)]
    pub graduation_wei_per_token: Option<u64>,

    /// Secondary position upper tick, in spacings below the primary upper tick
    #[arg(long)]
    pub secondary_offset_steps: Option<i32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl PoolArgs {
    pub fn merge(&self, base: &PoolConfig) -> PoolConfig {
        PoolConfig {
            tick_spacing: self.tick_spacing.unwrap_or(base.tick_spacing),
            tick_lower: self.tick_lower.unwrap_or(base.tick_lower),
            tick_upper: self.tick_upper.unwrap_or(base.tick_upper),
            graduation_wei_per_token: self
                .graduation_wei_per_token
                .unwrap_or(base.graduation_wei_per_token),
            secondary_upper_offset_steps: self
                .secondary_offset_steps
                .unwrap_or(base.secondary_upper_offset_steps),
        }
    }
}

pub fn exec(args: PoolArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let pool = args.merge(&config.pool);
    let settings = derive_pool_settings(&pool)?;

    if args.format.is_json() {
        return print_json(&settings);
    }
    print!("{}", render_solidity(&settings));
    Ok(())
}
