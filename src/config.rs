use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::{redeem::DEFAULT_ADMIN_CODE, session::DEFAULT_STARTING_BALANCE};

#[derive(Clone, Debug, Parser)]
#[command(name = "blackjack-server", version, about = "Single-player blackjack over HTTP")]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "BLACKJACK_LISTEN", default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// Directory served for every path outside `/api`.
    #[arg(long, env = "BLACKJACK_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Balance given to a player on first contact.
    #[arg(long, env = "BLACKJACK_STARTING_BALANCE", default_value_t = DEFAULT_STARTING_BALANCE)]
    pub starting_balance: u64,

    /// Code that unlocks admin mode. Empty disables it.
    #[arg(long, env = "BLACKJACK_ADMIN_CODE", default_value = DEFAULT_ADMIN_CODE)]
    pub admin_code: String,

    /// Single-use bonus code, as NAME=AMOUNT. Repeatable.
    #[arg(
        long = "redeem-code",
        env = "BLACKJACK_REDEEM_CODES",
        value_delimiter = ',',
        value_parser = parse_redeem_code,
        default_values = ["bonus100=100", "startbonus=500"]
    )]
    pub redeem_codes: Vec<(String, u64)>,

    #[arg(long, env = "BLACKJACK_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

fn parse_redeem_code(raw: &str) -> Result<(String, u64), String> {
    let (code, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got `{raw}`"))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(format!("empty code in `{raw}`"));
    }
    let amount = amount
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("invalid amount in `{raw}`: {err}"))?;
    Ok((code.to_string(), amount))
}
