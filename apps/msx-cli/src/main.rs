use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use msx_engine::Project;

mod error;
mod topology;

use error::CliResult;

#[derive(Parser)]
#[command(name = "msx-cli")]
#[command(about = "Multi-species water-quality simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a chemistry file and topology file for errors without running
    Validate {
        /// Path to the chemistry input file ([SPECIES]/[PIPES]/[TANKS]/...)
        #[arg(long)]
        chem: PathBuf,
        /// Path to the YAML topology file (nodes/links/tanks)
        #[arg(long)]
        topology: PathBuf,
    },
    /// Run a quality simulation against a precomputed hydraulics file
    Run {
        #[arg(long)]
        chem: PathBuf,
        #[arg(long)]
        topology: PathBuf,
        /// Path to a precomputed hydraulics file (spec §1: the hydraulic
        /// solve itself is an external collaborator)
        #[arg(long)]
        hyd: PathBuf,
        /// Where to write the binary results file
        #[arg(long)]
        out: PathBuf,
        /// Also write the text report here (defaults to stdout)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the text report for a previously written results file
    Report {
        #[arg(long)]
        chem: PathBuf,
        #[arg(long)]
        topology: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { chem, topology } => cmd_validate(&chem, &topology),
        Commands::Run {
            chem,
            topology,
            hyd,
            out,
            report,
        } => cmd_run(&chem, &topology, &hyd, &out, report.as_deref()),
        Commands::Report { chem, topology, out } => cmd_report(&chem, &topology, &out),
    }
}

fn open_project(chem: &std::path::Path, topology: &std::path::Path) -> CliResult<Project> {
    let builder = topology::load(topology)?;
    let text = fs::read_to_string(chem)?;
    let (project, _parsed) = Project::open(&text, builder)?;
    Ok(project)
}

fn cmd_validate(chem: &std::path::Path, topology: &std::path::Path) -> CliResult<()> {
    let project = open_project(chem, topology)?;
    let net = project.network();
    println!("✓ chemistry and topology are consistent");
    println!("  species:    {}", net.species().len());
    println!("  nodes:      {}", net.nodes().len());
    println!("  links:      {}", net.links().len());
    println!("  tanks:      {}", net.tanks().len());
    println!("  timestep:   {} s", project.options().timestep);
    Ok(())
}

fn cmd_run(
    chem: &std::path::Path,
    topology: &std::path::Path,
    hyd: &std::path::Path,
    out: &std::path::Path,
    report: Option<&std::path::Path>,
) -> CliResult<()> {
    let mut project = open_project(chem, topology)?;
    project.use_hyd_file(hyd);
    project.init()?;

    println!("running quality simulation...");
    let steps = project.run(out)?;
    println!("✓ wrote {} time steps to {}", steps.len(), out.display());

    match report {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            project.report(&steps, &mut file)?;
            println!("✓ wrote report to {}", path.display());
        }
        None => {
            let mut buf = Vec::new();
            project.report(&steps, &mut buf)?;
            print!("{}", String::from_utf8_lossy(&buf));
        }
    }
    Ok(())
}

fn cmd_report(chem: &std::path::Path, topology: &std::path::Path, out: &std::path::Path) -> CliResult<()> {
    let project = open_project(chem, topology)?;
    let mut reader = project.open_results(out)?;
    let mut steps = Vec::new();
    while let Some(step) = reader.next_step()? {
        steps.push(step);
    }
    let mut stdout = std::io::stdout();
    project.report(&steps, &mut stdout)?;
    Ok(())
}
