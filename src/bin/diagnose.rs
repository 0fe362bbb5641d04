//! Diagnostic tool - Check strategy configuration
//!
//! Run with: cargo run --bin diagnose

use std::env;

use compounder::StrategyConfig;

/// First 30 and last 15 characters of a URL longer than 50
fn shorten(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() <= 50 {
        return url.to_string();
    }
    let head: String = chars[..30].iter().collect();
    let tail: String = chars[chars.len() - 15..].iter().collect();
    format!("{}...{}", head, tail)
}

fn main() {
    println!("🔍 COMPOUNDER DIAGNOSTIC CHECK\n");

    // Load .env
    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                   ADDRESSES                        ");
    println!("═══════════════════════════════════════════════════\n");

    let required = [
        ("STRATEGY_ADDRESS", "The strategy's own account"),
        ("VAULT_ADDRESS", "Vault receiving withdrawals"),
        ("WANT_ADDRESS", "LP token being compounded"),
        ("REWARD_POOL_ADDRESS", "MasterChef style reward pool"),
        ("ROUTER_ADDRESS", "AMM router for swaps and liquidity"),
        ("REWARD_TOKEN", "Token paid by the reward pool"),
        ("FEE_ASSET_A", "Fee asset A / profit denomination"),
        ("FEE_ASSET_B", "Fee asset B"),
        ("FEE_REMITTERS", "Treasury payout list"),
        ("STRATEGISTS", "Strategist payout list"),
    ];

    for (key, desc) in required {
        let status = if env::var(key).is_ok() { "✅ Set" } else { "❌ Not set" };
        println!("  {:<22} {}", key, status);
        println!("    └─ {}\n", desc);
    }

    println!("═══════════════════════════════════════════════════");
    println!("                     FEES                           ");
    println!("═══════════════════════════════════════════════════\n");

    let fees = [
        ("POOL_ID", "0"),
        ("TOTAL_FEE", "200"),
        ("CALL_FEE", "100"),
        ("TREASURY_FEE", "9900"),
        ("STRATEGIST_FEE", "1000"),
        ("FEE_DENOMINATOR", "10000"),
        ("FEE_IN_ASSET_B", "false"),
    ];

    for (key, default) in fees {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
    }

    // RPC check
    let rpc = env::var("RPC_URL").unwrap_or_else(|_| "NOT SET".to_string());
    println!("\n  RPC_URL: {}", shorten(&rpc));

    println!("\n═══════════════════════════════════════════════════");
    println!("                     STATUS                         ");
    println!("═══════════════════════════════════════════════════\n");

    match StrategyConfig::from_env() {
        Err(e) => {
            println!("  ❌ Configuration incomplete: {}", e);
        }
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!("  ✅ Configuration valid");
                println!("     → Treasury:   {:?}", config.treasury());
                println!("     → Strategist: {:?}", config.strategist());
                if config.fee_remitters.len() > 1 || config.strategists.len() > 1 {
                    println!("\n  ⚠️  Only the first remitter and strategist receive fees.");
                }
            }
            Err(e) => {
                println!("  ❌ Configuration invalid: {}", e);
            }
        },
    }

    println!("\n✅ Diagnostic complete!\n");
}
