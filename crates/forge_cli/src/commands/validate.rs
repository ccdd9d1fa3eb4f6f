// Offline parameter checks

use anyhow::{Result, bail};
use clap::Args;
use forge_chain::TokenCreationRequest;
use forge_chain::validation::{
    format_number, validate_decimals, validate_supply, validate_token_name, validate_token_symbol,
};
use serde::Serialize;

use super::utils::{emit, success, warn};
use crate::context::AppContext;

#[derive(Args)]
pub struct ValidateCmd {
    /// Token name
    #[arg(long)]
    name: String,

    /// Token symbol (uppercase letters and digits)
    #[arg(long)]
    symbol: String,

    /// Decimal places, 0-18
    #[arg(long, default_value = "18", allow_hyphen_values = true)]
    decimals: String,

    /// Initial supply, in whole units
    #[arg(long, allow_hyphen_values = true)]
    supply: String,

    /// Optional supply cap
    #[arg(long)]
    max_supply: Option<String>,
}

#[derive(Serialize)]
struct Check {
    field: &'static str,
    value: String,
    ok: bool,
}

pub fn execute(cmd: ValidateCmd, ctx: &AppContext) -> Result<()> {
    let mut checks = vec![
        Check {
            field: "name",
            ok: validate_token_name(&cmd.name),
            value: cmd.name.clone(),
        },
        Check {
            field: "symbol",
            ok: validate_token_symbol(&cmd.symbol),
            value: cmd.symbol.clone(),
        },
        Check {
            field: "decimals",
            ok: validate_decimals(&cmd.decimals),
            value: cmd.decimals.clone(),
        },
        Check {
            field: "supply",
            // typed requests take whole numbers only
            ok: validate_supply(&cmd.supply) && cmd.supply.trim().parse::<u128>().is_ok(),
            value: cmd.supply.clone(),
        },
    ];
    if let Some(max) = &cmd.max_supply {
        checks.push(Check {
            field: "max_supply",
            ok: max.trim().parse::<u128>().is_ok(),
            value: max.clone(),
        });
    }

    // Field checks passed: run the full request gate, which adds the cap rule.
    let mut verdict = None;
    if checks.iter().all(|c| c.ok) {
        let mut request = TokenCreationRequest::new(
            cmd.name.clone(),
            cmd.symbol.clone(),
            cmd.decimals.trim().parse()?,
            cmd.supply.trim().parse()?,
        );
        if let Some(max) = &cmd.max_supply {
            request = request.with_max_supply(max.trim().parse()?);
        }
        verdict = Some(request.validate());
    }

    emit(ctx.json, &checks, |checks| {
        for check in checks {
            let mark = if check.ok { "ok" } else { "INVALID" };
            println!("{:<11} {:<8} {}", check.field, mark, check.value);
        }
    })?;

    match verdict {
        Some(Ok(())) => {
            if !ctx.json {
                let supply: u128 = cmd.supply.trim().parse()?;
                success(&format!(
                    "{} ({}) is valid, supply {}",
                    cmd.name,
                    cmd.symbol,
                    format_number(supply)
                ));
            }
            Ok(())
        }
        Some(Err(e)) => bail!(e),
        None => {
            warn("fix the fields marked INVALID");
            bail!("invalid token parameters")
        }
    }
}
