use clap::Args;
use serde_json::Value;

use loan_engine_core::consolidation::{self, ConsolidationInput};

use crate::input;

/// Arguments for the debt consolidation analysis
#[derive(Args)]
pub struct ConsolidateArgs {
    /// Path to JSON input file with `debts`, `loan` and optional `monthly_payment`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_consolidate(args: ConsolidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let consolidation_input: ConsolidationInput =
        input::require(args.input.as_deref(), "consolidation analysis")?;
    let result = consolidation::analyze_consolidation(&consolidation_input)?;
    Ok(serde_json::to_value(result)?)
}
