// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rmb_dashboard::{company_totals, format_millions, DashboardConfig, DashboardContext};

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config_path = take_option(&mut args, "--config")?;
    let json = take_flag(&mut args, "--json");

    let command = args.first().map(String::as_str);
    let interactive = matches!(command, None | Some("ui"));
    init_tracing(if interactive { "off" } else { "rmb_dashboard=info" });

    let config = DashboardConfig::resolve(config_path.as_deref())?;
    let ctx = DashboardContext::new(config);

    match command {
        None | Some("ui") => run_ui_mode(ctx, args.get(1).map(PathBuf::from)),
        Some("convert") => run_convert(&ctx, required(&args, "convert <digits>")?),
        Some("amount") => run_amount(&ctx, required(&args, "amount <yuan>")?),
        Some("parse") => run_parse(&ctx, required(&args, "parse <numeral>")?),
        Some("reshape") => run_reshape(&ctx, args.get(1).map(Path::new), json),
        Some("help" | "--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("Unknown command '{}'", other)
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("rmb-dashboard {}", rmb_dashboard::VERSION);
    println!();
    println!("Usage:");
    println!("  rmb-dashboard [ui] [<sheet.csv>]        Interactive dashboard");
    println!("  rmb-dashboard convert <digits>          Integer -> RMB numeral");
    println!("  rmb-dashboard amount <yuan>             Amount (2 decimals) -> 元/角/分");
    println!("  rmb-dashboard parse <numeral>           RMB numeral -> integer");
    println!("  rmb-dashboard reshape [<sheet.csv>]     Revenue totals and monthly trend");
    println!();
    println!("Options:");
    println!("  --config <file>   JSON config (default: $RMB_DASHBOARD_CONFIG or ./dashboard.json)");
    println!("  --json            Print the reshape report as JSON");
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|a| a == flag) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<PathBuf>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} needs a value", name);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(PathBuf::from(value)))
}

fn required<'a>(args: &'a [String], usage: &str) -> Result<&'a str> {
    match args.get(1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Usage: rmb-dashboard {}", usage),
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_convert(ctx: &DashboardContext, input: &str) -> Result<()> {
    let numeral = ctx.convert_input(input)?;
    println!("Chinese Numerals: {}", numeral);
    Ok(())
}

fn run_amount(ctx: &DashboardContext, input: &str) -> Result<()> {
    let numeral = ctx.convert_amount(input)?;
    println!("{}", numeral);
    Ok(())
}

fn run_parse(ctx: &DashboardContext, input: &str) -> Result<()> {
    let value = ctx.parse_numeral(input)?;
    println!("{}", value);
    Ok(())
}

fn run_reshape(ctx: &DashboardContext, sheet: Option<&Path>, json: bool) -> Result<()> {
    let analytics = ctx.load_analytics(sheet)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analytics.report)?);
        return Ok(());
    }

    println!("📊 Company Revenue Total");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for total in company_totals(&analytics.rows) {
        println!(
            "  {:<20} {:>16.2}  ({})",
            total.company,
            total.total_revenue,
            format_millions(total.total_revenue)
        );
    }

    println!("\n📈 Company Revenue Trend");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let wide = &analytics.report.wide;
    let mut header = format!("  {:>6}", "月份");
    for company in &wide.companies {
        header.push_str(&format!(" {:>14}", company));
    }
    println!("{}", header);
    for (month, values) in wide.rows() {
        let mut line = format!("  {:>6}", month.index());
        for value in values {
            line.push_str(&format!(" {:>14.2}", value));
        }
        println!("{}", line);
    }

    println!("\n✓ {} rows → {} monthly entries", analytics.rows.len(), analytics.report.long.len());
    println!("✓ Digest: {}", analytics.report.digest());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(ctx: DashboardContext, sheet: Option<PathBuf>) -> Result<()> {
    // A missing or broken sheet only disables the analytics pages
    let analytics = ctx
        .load_analytics(sheet.as_deref())
        .map_err(|e| format!("{:#}", e));

    let mut app = ui::App::new(ctx, analytics);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_ctx: DashboardContext, _sheet: Option<PathBuf>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand: rmb-dashboard help");
    std::process::exit(1);
}
