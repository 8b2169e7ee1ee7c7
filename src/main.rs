//! Golfbet - Interactive Settlement Table
//!
//! Terminal host for the settlement engine: enter each hole's par and
//! scores, watch the money move, undo mis-entries, and collect the
//! next-round handicap when hole 18 is in.
//!
//! # Usage
//!
//! ```bash
//! golfbet                                  # classic rules, players A B C D
//! golfbet --base 10000 --max 40000
//! golfbet --policy batch --mode pairwise --cap per-pair
//! golfbet --rules table.toml --players Kim,Lee,Park,Choi
//! ```
//!
//! At the prompt, enter a hole as `<par> <score> <score> ...` where each
//! score is a stroke count (1-10) or a named result (birdie, par, bogey,
//! double, ...). Commands: `undo`, `reset`, `total`, `history`, `rules`,
//! `handicap`, `export <path>`, `help`, `quit`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use golfbet_backend::round::{
    format_won, settle_hole, Amount, CapMode, Flow, HandicapResult, HoleInput, HoleResult,
    MultiplierPolicy, NamedResult, RoundLedger, RuleConfig, ScoreEntry, SettledHole,
    SettlementMode, Trigger, HOLES_PER_ROUND,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest stroke count the table accepts at the prompt. The engine itself
/// only requires >= 1; this bound is a host-side typo guard.
const MAX_PROMPT_STROKES: u8 = 10;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Capped additive doubling (saturates at 4x)
    Additive,
    /// Multiplicative batch doubling (reaches 8x)
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Per-pair stakes from each pair's own bonuses
    Pairwise,
    /// One hole-wide stake for every pair
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CapArg {
    /// Cap the per-stroke stake
    PerStroke,
    /// Cap each pair's total
    PerPair,
}

#[derive(Parser, Debug)]
#[command(name = "golfbet")]
#[command(about = "Interactive golf wagering settlement table")]
struct Args {
    /// Base stake per stroke (won)
    #[arg(long)]
    base: Option<Amount>,

    /// Monetary cap (won); see --cap for granularity
    #[arg(long)]
    max: Option<Amount>,

    /// Remove the monetary cap entirely
    #[arg(long, default_value = "false")]
    no_cap: bool,

    /// Disable the birdie bonus
    #[arg(long, default_value = "false")]
    no_birdie_bonus: bool,

    /// Disable the eagle bonus
    #[arg(long, default_value = "false")]
    no_eagle_bonus: bool,

    /// Multiplier policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Settlement mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Cap granularity
    #[arg(long, value_enum)]
    cap: Option<CapArg>,

    /// TOML rule preset file (flags override its fields)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Comma-separated player names
    #[arg(long, value_delimiter = ',', default_values_t = default_players())]
    players: Vec<String>,
}

fn default_players() -> Vec<String> {
    ["A", "B", "C", "D"].map(String::from).to_vec()
}

impl Args {
    /// Resolve the rule configuration: preset file first, then flag
    /// overrides on top.
    fn resolve_rules(&self) -> Result<RuleConfig> {
        let mut rules = match &self.rules {
            Some(path) => RuleConfig::from_path(path)
                .with_context(|| format!("Loading rules from {}", path.display()))?,
            None => RuleConfig::default(),
        };
        if let Some(base) = self.base {
            rules.base_amount = base;
        }
        if let Some(max) = self.max {
            rules.max_amount = Some(max);
        }
        if self.no_cap {
            rules.max_amount = None;
        }
        if self.no_birdie_bonus {
            rules.birdie_bonus = false;
        }
        if self.no_eagle_bonus {
            rules.eagle_bonus = false;
        }
        if let Some(policy) = self.policy {
            rules.multiplier_policy = match policy {
                PolicyArg::Additive => MultiplierPolicy::AdditiveDoubling,
                PolicyArg::Batch => MultiplierPolicy::MultiplicativeBatch,
            };
        }
        if let Some(mode) = self.mode {
            rules.settlement_mode = match mode {
                ModeArg::Pairwise => SettlementMode::Pairwise,
                ModeArg::Flat => SettlementMode::FlatStake,
            };
        }
        if let Some(cap) = self.cap {
            rules.cap_mode = match cap {
                CapArg::PerStroke => CapMode::PerStroke,
                CapArg::PerPair => CapMode::PerPair,
            };
        }
        rules.validate().context("Invalid rule configuration")?;
        Ok(rules)
    }
}

// =============================================================================
// ROUND EXPORT
// =============================================================================

/// JSON export of the round for sharing or later reloading.
#[derive(Debug, Serialize)]
struct RoundExport<'a> {
    exported_at: DateTime<Utc>,
    players: &'a [String],
    ledger: &'a RoundLedger,
}

fn export_round(path: &str, players: &[String], ledger: &RoundLedger) -> Result<()> {
    let export = RoundExport {
        exported_at: Utc::now(),
        players,
        ledger,
    };
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json).with_context(|| format!("Writing export to {}", path))?;
    info!(path, "round exported");
    println!("Round exported to {}", path);
    Ok(())
}

// =============================================================================
// SCORE LINE PARSING
// =============================================================================

/// Parse `<par> <score> <score> ...` where a score is a stroke count or a
/// named result.
fn parse_hole_line(line: &str, players: usize) -> Result<(u8, Vec<ScoreEntry>)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != players + 1 {
        bail!(
            "Expected par plus {} scores, got {} tokens",
            players,
            tokens.len()
        );
    }
    let par: u8 = tokens[0]
        .parse()
        .with_context(|| format!("Par must be a number, got '{}'", tokens[0]))?;

    let mut scores = Vec::with_capacity(players);
    for token in &tokens[1..] {
        scores.push(parse_score_token(token)?);
    }
    Ok((par, scores))
}

fn parse_score_token(token: &str) -> Result<ScoreEntry> {
    if let Ok(strokes) = token.parse::<u8>() {
        if !(1..=MAX_PROMPT_STROKES).contains(&strokes) {
            bail!("Strokes must be 1-{}, got {}", MAX_PROMPT_STROKES, strokes);
        }
        return Ok(ScoreEntry::Strokes(strokes));
    }
    let named: NamedResult = token
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(ScoreEntry::Named(named))
}

// =============================================================================
// RENDERING
// =============================================================================

fn render_flow_line(name: &str, delta: Amount) -> String {
    match Flow::of(delta) {
        Flow::Pays => format!("{}: pays {}", name, format_won(delta)),
        Flow::Receives => format!("{}: receives {}", name, format_won(-delta)),
        Flow::Even => format!("{}: even", name),
    }
}

fn render_result(names: &[String], result: &HoleResult) {
    if result.all_tied {
        println!("All tied at {} strokes - no money moves, next hole doubles.", result.strokes[0]);
        return;
    }

    println!("Hole result (multiplier up to {}x):", result.applied_multiplier);
    for (name, &delta) in names.iter().zip(&result.per_player_delta) {
        println!("  {}", render_flow_line(name, delta));
    }

    let n = names.len();
    let mut payments = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let amount = result.matrix[i][j];
            match Flow::of(amount) {
                Flow::Pays => payments.push(format!(
                    "  {} -> {}: {}",
                    names[i],
                    names[j],
                    format_won(amount)
                )),
                Flow::Receives => payments.push(format!(
                    "  {} -> {}: {}",
                    names[j],
                    names[i],
                    format_won(-amount)
                )),
                Flow::Even => {}
            }
        }
    }
    if !payments.is_empty() {
        println!("Payments:");
        for line in payments {
            println!("{}", line);
        }
    }

    for trigger in &result.triggers {
        match trigger {
            Trigger::BirdieBonus { player } => {
                println!("  * {} birdie - strokes count double", names[*player]);
            }
            Trigger::EagleBonus { player } => {
                println!("  * {} eagle - strokes count quadruple", names[*player]);
            }
            Trigger::ThreeWayTie { strokes, players } => {
                println!("  * {} players tied at {} - stake doubled", players, strokes);
            }
            Trigger::CarriedTie => println!("  * carried all-tie - stake doubled"),
            Trigger::BonusBatch => println!("  * birdie/eagle on the hole - stake doubled"),
            Trigger::StakeCapped {
                payer,
                payee,
                uncapped,
                capped,
            } => println!(
                "  * cap: {} -> {} clamped {} to {}",
                names[*payer],
                names[*payee],
                format_won(*uncapped),
                format_won(*capped)
            ),
            Trigger::AllTied => {}
        }
    }
}

fn render_totals(names: &[String], ledger: &RoundLedger) {
    println!("Running totals after hole {}:", ledger.current_hole().saturating_sub(1));
    for (name, &total) in names.iter().zip(ledger.cumulative()) {
        println!("  {}", render_flow_line(name, total));
    }
}

fn render_history(names: &[String], history: &[SettledHole]) {
    if history.is_empty() {
        println!("No holes settled yet.");
        return;
    }
    for entry in history {
        let strokes: Vec<String> = entry.result.strokes.iter().map(u8::to_string).collect();
        let deltas: Vec<String> = names
            .iter()
            .zip(&entry.result.per_player_delta)
            .map(|(name, &delta)| format!("{} {:+}", name, delta))
            .collect();
        println!(
            "  hole {:>2} par {} [{}] {}{}",
            entry.hole,
            entry.input.par,
            strokes.join(" "),
            deltas.join(", "),
            if entry.result.all_tied { "  (all tied)" } else { "" },
        );
    }
}

fn render_handicap(names: &[String], handicap: &HandicapResult) {
    println!("Next-round handicap (total strokes, stake per stroke gap):");
    for (i, name) in names.iter().enumerate() {
        let delta = handicap.per_player_delta[i];
        let stake = match Flow::of(delta) {
            Flow::Pays => format!("pays {}", format_won(delta)),
            Flow::Receives => format!("receives {}", format_won(-delta)),
            Flow::Even => "even".to_string(),
        };
        println!("  {}: {} strokes, {}", name, handicap.total_strokes[i], stake);
    }
}

fn render_final(names: &[String], ledger: &RoundLedger) {
    println!();
    println!("=== Round complete! Final settlement ===");
    for (name, &total) in names.iter().zip(ledger.cumulative()) {
        println!("  {}", render_flow_line(name, total));
    }
    println!("Commands still available: handicap, export <path>, history, reset, quit");
}

fn print_help() {
    println!("Enter a hole:  <par> <score> <score> ...   e.g.  4 3 4 4 5");
    println!("               scores are strokes (1-10) or names:");
    println!("               eagle birdie par bogey double triple quad");
    println!("Commands:      undo | reset | total | history | rules");
    println!("               handicap | export <path> | help | quit");
}

// =============================================================================
// INTERACTIVE LOOP
// =============================================================================

fn handle_hole_line(
    line: &str,
    names: &[String],
    rules: &RuleConfig,
    ledger: &mut RoundLedger,
) -> Result<()> {
    if ledger.round_complete() {
        bail!("Round complete - use `reset` to start a new round");
    }
    let (par, scores) = parse_hole_line(line, names.len())?;
    let input = HoleInput {
        par,
        scores,
        prev_all_tied: ledger.prev_all_tied(),
        rules: rules.clone(),
    };
    let result = settle_hole(&input)?;
    render_result(names, &result);
    ledger.commit(input, result)?;
    render_totals(names, ledger);
    if ledger.round_complete() {
        render_final(names, ledger);
    }
    Ok(())
}

fn run(names: Vec<String>, rules: RuleConfig) -> Result<()> {
    let mut ledger = RoundLedger::new(names.len());

    println!("=== Golfbet settlement table ===");
    println!("Players: {}", names.join(", "));
    println!("Rules:   {}", rules.summary());
    print_help();

    let stdin = io::stdin();
    loop {
        if ledger.round_complete() {
            print!("round over> ");
        } else {
            print!("hole {}> ", ledger.current_hole());
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let outcome = match command {
            "quit" | "exit" => break,
            "help" => {
                print_help();
                Ok(())
            }
            "undo" => {
                if ledger.undo() {
                    println!("Hole reverted.");
                    render_totals(&names, &ledger);
                } else {
                    println!("Nothing to undo.");
                }
                Ok(())
            }
            "reset" => {
                ledger.reset();
                println!("New round started.");
                Ok(())
            }
            "total" => {
                render_totals(&names, &ledger);
                Ok(())
            }
            "history" => {
                render_history(&names, ledger.history());
                Ok(())
            }
            "rules" => {
                println!("{}", rules.summary());
                Ok(())
            }
            "handicap" => match ledger.compute_handicap(rules.base_amount) {
                Ok(handicap) => {
                    render_handicap(&names, &handicap);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            "export" => match words.next() {
                Some(path) => export_round(path, &names, &ledger),
                None => Err(anyhow::anyhow!("export needs a path: export round.json")),
            },
            _ => handle_hole_line(line, &names, &rules, &mut ledger),
        };

        if let Err(e) = outcome {
            println!("! {:#}", e);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    if args.players.len() < 2 {
        bail!("At least two players required");
    }
    let rules = args.resolve_rules()?;
    info!(players = args.players.len(), holes = HOLES_PER_ROUND, "table opened");

    run(args.players, rules)
}

/// Initialize tracing; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "golfbet_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hole_line_numeric_and_named() {
        let (par, scores) = parse_hole_line("4 3 par bogey 5", 4).unwrap();
        assert_eq!(par, 4);
        assert_eq!(scores[0], ScoreEntry::Strokes(3));
        assert_eq!(scores[1], ScoreEntry::Named(NamedResult::Par));
        assert_eq!(scores[2], ScoreEntry::Named(NamedResult::Bogey));
        assert_eq!(scores[3], ScoreEntry::Strokes(5));
    }

    #[test]
    fn test_parse_hole_line_rejects_wrong_count() {
        assert!(parse_hole_line("4 3 4", 4).is_err());
        assert!(parse_hole_line("4 3 4 4 5 6", 4).is_err());
    }

    #[test]
    fn test_parse_score_token_bounds() {
        assert!(parse_score_token("0").is_err());
        assert!(parse_score_token("11").is_err());
        assert!(parse_score_token("10").is_ok());
        assert!(parse_score_token("albatross").is_err());
    }
}
