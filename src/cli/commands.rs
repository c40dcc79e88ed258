use crate::core::grid::Grid;
use crate::core::range::RangeAddress;
use crate::core::report::{
    ReportGenerator, ReportSummary, DEMAND_SHEET, GROUP_KEY_RANGE, IDLE_STATUS, INFO_REF_SHEET,
};
use crate::core::scanner;
use crate::error::{ReportError, ReportResult};
use crate::excel;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::thread;

/// Execute the generate command: load, run the generator (on a background
/// worker by default, with progress relayed over a channel), save.
pub fn generate(
    input: PathBuf,
    output: PathBuf,
    verbose: bool,
    foreground: bool,
) -> ReportResult<()> {
    println!("{}", "🚦 RYG Report - Generating".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}", output.display());
    println!();

    let mut grid = excel::load(&input)?;

    if verbose {
        println!("{}", "📖 Loaded sheets:".cyan());
        for name in grid.sheet_names() {
            println!("   {name}");
        }
        println!();
    }

    let summary = if foreground {
        let mut generator = ReportGenerator::new()
            .with_progress(Box::new(|status| println!("   {}", status.cyan())));
        generator.generate(&mut grid)?
    } else {
        let (result_grid, summary) = run_in_background(grid)?;
        grid = result_grid;
        summary
    };

    println!("   {}", "Saving workbook...".cyan());
    excel::save(&grid, &output)?;

    println!();
    println!("{}", "✅ Report generated".bold().green());
    print_summary(&summary);
    Ok(())
}

/// Run the generator on a single worker thread so the caller stays
/// responsive; only one worker ever touches the grid. Status strings arrive
/// over an mpsc channel and are printed as they come.
fn run_in_background(mut grid: Grid) -> ReportResult<(Grid, ReportSummary)> {
    let (tx, rx) = channel::<String>();

    let handle = thread::spawn(move || {
        let mut generator = ReportGenerator::new().with_progress(Box::new(move |status| {
            let _ = tx.send(status.to_string());
        }));
        generator
            .generate(&mut grid)
            .map(|summary| (grid, summary))
    });

    // the channel closes when the worker drops its sender
    for status in rx {
        if status != IDLE_STATUS {
            println!("   {}", status.cyan());
        }
    }

    handle
        .join()
        .map_err(|_| ReportError::Workbook("report worker panicked".to_string()))?
}

/// Execute the validate command: check the workbook against the input
/// conventions without writing anything.
pub fn validate(input: PathBuf) -> ReportResult<()> {
    println!("{}", "🔍 RYG Report - Validating input".bold().green());
    println!("   File: {}", input.display());
    println!();

    let grid = excel::load(&input)?;

    let mut problems: Vec<String> = Vec::new();
    if grid.sheet(INFO_REF_SHEET).is_none() {
        problems.push(format!("missing sheet '{INFO_REF_SHEET}'"));
    }
    match grid.sheet(DEMAND_SHEET) {
        None => problems.push(format!("missing sheet '{DEMAND_SHEET}'")),
        Some(demand) => {
            let range = RangeAddress::parse(GROUP_KEY_RANGE)?;
            let groups = scanner::unique_string_values(demand, &range);
            if groups.is_empty() {
                problems.push(format!("no group keys in {DEMAND_SHEET}!{GROUP_KEY_RANGE}"));
            } else {
                println!("   Found {} material groups", groups.len());
            }
        }
    }

    if problems.is_empty() {
        println!("{}", "✅ Input workbook looks valid".bold().green());
        Ok(())
    } else {
        for problem in &problems {
            println!("   {} {}", "✗".red(), problem.red());
        }
        Err(ReportError::Workbook(format!(
            "validation failed: {}",
            problems.join("; ")
        )))
    }
}

fn print_summary(summary: &ReportSummary) {
    println!(
        "   {} groups, {} materials",
        summary.groups.to_string().bold(),
        summary.materials.to_string().bold()
    );
}
