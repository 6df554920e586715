use crate::domain::model::Currency;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront-maint")]
#[command(about = "Maintenance and verification jobs for the storefront document store")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "maint.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log process CPU and memory between job phases
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Compute and log changes without writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Rewrite stored price fields into canonical USD/INR form
    NormalizePrices,
    /// Compute commissions per document and write a CSV report
    Commissions,
    /// Link users into a three-level referral chain for test data
    SeedReferrals,
    /// Self-check the rank table's commission arithmetic
    VerifyRanks,
    /// Normalize a single value and print it
    Normalize {
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, default_value = "USD", value_parser = parse_currency)]
        currency: Currency,
    },
}

fn parse_currency(value: &str) -> Result<Currency, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_with_globals() {
        let cli = Cli::parse_from([
            "storefront-maint",
            "normalize-prices",
            "--config",
            "prod.toml",
            "--dry-run",
        ]);
        assert_eq!(cli.config, "prod.toml");
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Command::NormalizePrices));
    }

    #[test]
    fn test_parse_normalize() {
        let cli = Cli::parse_from(["storefront-maint", "normalize", "1,50,000", "--currency", "inr"]);
        match cli.command {
            Command::Normalize { value, currency } => {
                assert_eq!(value, "1,50,000");
                assert_eq!(currency, Currency::Inr);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.config, "maint.toml");
    }

    #[test]
    fn test_unknown_currency_rejected() {
        assert!(Cli::try_parse_from(["storefront-maint", "normalize", "5", "--currency", "EUR"])
            .is_err());
    }
}
