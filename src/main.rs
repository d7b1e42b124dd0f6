//! shipquote command line front end
//!
//! Every command loads the saved calculator state, performs one action,
//! saves the state back and prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use shipquote::catalog::{Localized, PipeCoefficient, PipeMaterial, RATIOS_SECTION};
use shipquote::estimate::{Entry, EstimateTable};
use shipquote::pricing::services::{DEFAULT_WATERLINE_M, MARKS_SECTION};
use shipquote::pricing::{PipeSelection, PriceBreakdown, SiteCondition, WorkSelection};
use shipquote::session::{paint, pipes, AreaKind};
use shipquote::storage::{clear_state, load_state, save_state, FileStore};
use shipquote::{Catalog, Config, PaintCalculator, PipesCalculator};

#[derive(Parser)]
#[command(name = "shipquote")]
#[command(about = "Ship maintenance quoting: hull paint/cleaning and pipe work")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for saved calculator state
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the pricelists
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Paint and cleaning estimate
    Paint {
        #[command(subcommand)]
        command: PaintCommand,
    },

    /// Pipe work estimate
    Pipes {
        #[command(subcommand)]
        command: PipesCommand,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List priceable items
    Items {
        /// Only this section (cleaning, painting, marks, other)
        #[arg(long)]
        section: Option<String>,
    },

    /// List available pipe diameters
    Diameters,
}

#[derive(Subcommand)]
enum PaintCommand {
    /// Price a work and add it to the current area's section
    Add {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        work: WorkArgs,
    },

    /// Show the estimate
    List,

    /// Remove an entry by index
    Remove { index: usize },

    /// Remove everything and forget the saved state
    Clear,

    /// Print the estimate as tab-separated text
    Export,

    /// Explain how a row's price was reached
    Breakdown { index: usize },

    /// Add re-painting of marks (all marks when none are given)
    Marks {
        /// Mark keys from the marks section
        #[arg(long = "mark")]
        marks: Vec<String>,

        /// Waterline length in metres
        #[arg(long)]
        waterline: Option<Decimal>,
    },

    /// Re-price a row with changed inputs, keeping its position and area
    Edit {
        index: usize,
        #[command(flatten)]
        work: WorkArgs,
    },
}

#[derive(Subcommand)]
enum PipesCommand {
    /// Price a pipe and add it to the estimate
    Add {
        #[command(flatten)]
        pipe: PipeArgs,
    },

    /// Show the estimate
    List,

    /// Remove a row by index
    Remove { index: usize },

    /// Remove everything and forget the saved state
    Clear,

    /// Print the estimate as tab-separated text
    Export,

    /// Explain how a row's price was reached
    Breakdown { index: usize },

    /// Re-price a row with changed inputs, keeping its position
    Edit {
        index: usize,
        #[command(flatten)]
        pipe: PipeArgs,
    },
}

#[derive(Args, Debug, Default)]
struct AreaArgs {
    /// Ship area (topside, boottop, vertical, flat_bottom, hold, cranes, ...)
    #[arg(long)]
    area_kind: Option<AreaKind>,

    /// Custom area name (English); replaces --area-kind
    #[arg(long)]
    custom_area: Option<String>,

    /// Custom area name (Russian); defaults to the English name
    #[arg(long, requires = "custom_area")]
    custom_area_ru: Option<String>,

    /// Ratio applied to every work in the custom area (repeatable)
    #[arg(long = "auto-ratio", requires = "custom_area")]
    auto_ratios: Vec<String>,

    /// Total area of the section in sq.m
    #[arg(long)]
    area: Option<Decimal>,
}

impl AreaArgs {
    fn apply(self, calc: &mut PaintCalculator) {
        if let Some(en) = self.custom_area {
            let ru = self.custom_area_ru.unwrap_or_else(|| en.clone());
            calc.area_kind = AreaKind::Custom {
                name: Localized::new(en, ru),
                auto_ratios: self.auto_ratios,
            };
        } else if let Some(kind) = self.area_kind {
            calc.area_kind = kind;
        }
        if let Some(area) = self.area {
            calc.area_total = area;
        }
    }
}

#[derive(Args, Debug, Default)]
struct WorkArgs {
    /// Catalog path, e.g. cleaning.sand_blasting.sa2
    #[arg(long)]
    path: Option<String>,

    /// Coverage percent of the section area (1-100)
    #[arg(long)]
    percent: Option<u8>,

    /// Quantity for items not priced by area
    #[arg(long)]
    qty: Option<Decimal>,

    /// Two-component (epoxy) paint
    #[arg(long)]
    double_component: bool,

    #[arg(long)]
    dft150: bool,

    #[arg(long)]
    dft200: bool,

    /// Dry-film thickness in microns
    #[arg(long)]
    custom_dft: Option<u32>,

    /// Site condition (repeatable): framework, confined, hold, ice-paint, ...
    #[arg(long = "condition")]
    conditions: Vec<SiteCondition>,

    /// Drop coverage and modifiers carried over from the edited row
    #[arg(long)]
    clear_modifiers: bool,
}

impl WorkArgs {
    fn apply(self, work: &mut WorkSelection) {
        if self.clear_modifiers {
            work.reset_modifiers();
        }
        if let Some(path) = self.path {
            work.path = path;
        }
        if let Some(percent) = self.percent {
            work.percent = percent;
        }
        if self.qty.is_some() {
            work.quantity = self.qty;
        }
        work.painting.double_component |= self.double_component;
        work.painting.dft150 |= self.dft150;
        work.painting.dft200 |= self.dft200;
        if self.custom_dft.is_some() {
            work.painting.custom_dft = self.custom_dft;
        }
        work.conditions.extend(self.conditions);
    }
}

#[derive(Args, Debug, Default)]
struct PipeArgs {
    /// black or galvanized
    #[arg(long)]
    material: Option<PipeMaterial>,

    /// Nominal diameter (DN)
    #[arg(long)]
    diameter: Option<u32>,

    /// Length in mm
    #[arg(long)]
    length: Option<u32>,

    #[arg(long)]
    pieces: Option<u32>,

    #[arg(long)]
    flanges: Option<u32>,

    #[arg(long)]
    elbows: Option<u32>,

    /// Coefficient name (repeatable): engineRoom, sch80, copper, ...
    #[arg(long = "coefficient")]
    coefficients: Vec<PipeCoefficient>,

    /// Drop all coefficients before applying --coefficient
    #[arg(long)]
    reset_coefficients: bool,
}

impl PipeArgs {
    fn apply(self, work: &mut PipeSelection) {
        if let Some(material) = self.material {
            work.material = material;
        }
        if let Some(diameter) = self.diameter {
            work.diameter = diameter;
        }
        if let Some(length) = self.length {
            work.length_mm = length;
        }
        if let Some(pieces) = self.pieces {
            work.pieces = pieces;
        }
        if let Some(flanges) = self.flanges {
            work.flanges = flanges;
        }
        if let Some(elbows) = self.elbows {
            work.elbows = elbows;
        }
        if self.reset_coefficients {
            work.coefficients.clear();
        }
        work.coefficients.extend(self.coefficients);
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shipquote=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.state_dir.is_some() {
        config.state_dir = cli.state_dir;
    }

    match cli.command {
        Commands::Catalog { command } => run_catalog(&config, command),
        Commands::Paint { command } => run_paint(&config, command),
        Commands::Pipes { command } => run_pipes(&config, command),
    }
}

fn run_catalog(config: &Config, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Items { section } => {
            let catalog = config.load_catalog()?;
            let sections: Vec<String> = match section {
                Some(section) => vec![section],
                None => catalog
                    .sections()
                    .filter(|s| *s != RATIOS_SECTION)
                    .map(str::to_string)
                    .collect(),
            };
            for section in sections {
                for (path, item) in catalog.price_items(&section)? {
                    println!("{}\t{}\t{}\t{}", path, item.name.en, item.unit, item.price);
                }
            }
        }
        CatalogCommand::Diameters => {
            let table = config.load_pipes()?;
            let diameters: Vec<String> = table
                .available_diameters()
                .iter()
                .map(|d| format!("DN{}", d))
                .collect();
            println!("{}", diameters.join(" "));
        }
    }
    Ok(())
}

fn run_paint(config: &Config, command: PaintCommand) -> Result<()> {
    let store = config.state_store()?;
    let catalog = config.load_catalog()?;
    let mut calc: PaintCalculator = load_state(&store, paint::STORAGE_KEY).unwrap_or_default();

    match command {
        PaintCommand::Add { area, work } => {
            area.apply(&mut calc);
            work.apply(&mut calc.work);
            calc.add_work(&catalog).context("add work")?;
            save(&store, paint::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
        PaintCommand::List => print_table(calc.table(), calc.sum()),
        PaintCommand::Remove { index } => {
            calc.remove(index)?;
            save(&store, paint::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
        PaintCommand::Clear => {
            calc.clear();
            clear_state(&store, paint::STORAGE_KEY);
        }
        PaintCommand::Export => println!("{}", calc.export()),
        PaintCommand::Breakdown { index } => print_breakdown(&calc.breakdown(&catalog, index)?)?,
        PaintCommand::Marks { marks, waterline } => {
            let keys = if marks.is_empty() { all_marks(&catalog)? } else { marks };
            let waterline = waterline.unwrap_or(DEFAULT_WATERLINE_M);
            calc.add_marks(&catalog, &keys, waterline).context("add marks")?;
            save(&store, paint::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
        PaintCommand::Edit { index, work } => {
            calc.start_edit(index)?;
            work.apply(&mut calc.work);
            calc.save_edit(&catalog).context("save edit")?;
            save(&store, paint::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
    }
    Ok(())
}

fn run_pipes(config: &Config, command: PipesCommand) -> Result<()> {
    let store = config.state_store()?;
    let table = config.load_pipes()?;
    let mut calc: PipesCalculator = load_state(&store, pipes::STORAGE_KEY).unwrap_or_default();

    match command {
        PipesCommand::Add { pipe } => {
            pipe.apply(&mut calc.work);
            calc.add_work(&table).context("add pipe")?;
            save(&store, pipes::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
        PipesCommand::List => print_table(calc.table(), calc.sum()),
        PipesCommand::Remove { index } => {
            calc.remove(index)?;
            save(&store, pipes::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
        PipesCommand::Clear => {
            calc.clear();
            clear_state(&store, pipes::STORAGE_KEY);
        }
        PipesCommand::Export => println!("{}", calc.export()),
        PipesCommand::Breakdown { index } => print_breakdown(&calc.breakdown(&table, index)?)?,
        PipesCommand::Edit { index, pipe } => {
            calc.start_edit(index)?;
            pipe.apply(&mut calc.work);
            calc.save_edit(&table).context("save edit")?;
            save(&store, pipes::STORAGE_KEY, &calc);
            print_table(calc.table(), calc.sum());
        }
    }
    Ok(())
}

fn all_marks(catalog: &Catalog) -> Result<Vec<String>> {
    let prefix = format!("{}.", MARKS_SECTION);
    Ok(catalog
        .price_items(MARKS_SECTION)?
        .into_iter()
        .filter_map(|(path, _)| path.strip_prefix(&prefix).map(str::to_string))
        .collect())
}

fn save<T: serde::Serialize>(store: &FileStore, key: &str, state: &T) {
    if !save_state(store, key, state) {
        eprintln!("warning: state not saved, changes will not persist");
    }
}

fn print_table<K>(table: &EstimateTable<K>, sum: Decimal) {
    for (index, entry) in table.entries().iter().enumerate() {
        match entry {
            Entry::Section(header) => println!("{:>3}  == {} ==", index, header.title.en),
            Entry::Row(row) => println!(
                "{:>3}  {}  {} {} x {:.2} = {:.2}",
                index,
                row.title.en,
                row.quantity.normalize(),
                row.unit,
                row.unit_price,
                row.total
            ),
        }
    }
    println!("Total: {:.2}", sum);
}

fn print_breakdown(breakdown: &PriceBreakdown) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(breakdown)?);
    Ok(())
}
