// Network listing

use anyhow::Result;

use super::utils::emit;
use crate::context::AppContext;

pub fn execute(ctx: &AppContext) -> Result<()> {
    let networks = ctx.registry.all();
    emit(ctx.json, &networks, |networks| {
        for n in networks {
            let custom = if n.is_custom { " (custom)" } else { "" };
            println!(
                "{:<15} {:<16} chain {:<4} {} {}{custom}",
                n.chain.key(),
                n.name,
                n.chain_id,
                n.native_currency.symbol,
                n.rpc_url
            );
        }
    })
}
