mod checklist;
mod error;
mod mapper;
mod model;
mod parser;
mod validate;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "proposal_mapper",
    about = "Extract slide structures, project info and checklist updates from proposal markdown"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a proposal template to slide-structure JSON + summary
    Map {
        /// Proposal markdown file
        proposal: PathBuf,
        /// Architecture diagram markdown containing a mermaid block
        #[arg(short, long)]
        diagram: Option<PathBuf>,
        /// Output directory (default: alongside the proposal)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Extract project info JSON to stdout
    Parse {
        /// Proposal markdown file
        proposal: PathBuf,
    },
    /// Apply checklist answers to a template (in place with backup)
    Update {
        /// Checklist markdown file
        checklist: PathBuf,
        /// Template markdown file
        template: PathBuf,
        /// Write the result here instead of updating in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that every checklist row has a presale answer
    CheckChecklist {
        /// Checklist markdown file
        checklist: PathBuf,
        /// Cross-reference placeholder IDs against this template
        template: Option<PathBuf>,
    },
    /// Check that a finalized template has no placeholders left
    CheckTemplate {
        /// Template markdown file
        template: PathBuf,
    },
    /// Verify structural invariants of a slide-structure JSON
    Verify {
        /// Slide-structure JSON file
        structure: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map {
            proposal,
            diagram,
            output_dir,
        } => {
            println!("Parsing proposal: {}", proposal.display());
            let doc = parser::ProposalDoc::load(&proposal)?;
            println!("Extracted {} sections", doc.sections.len());

            let deck = mapper::SlideMapper::new(&doc, diagram.as_deref()).map();
            let (json_path, summary_path) =
                mapper::write_outputs(&deck, &proposal, output_dir.as_deref())?;

            println!("\nProject: {}", deck.project_name);
            println!("Client:  {}", deck.client_name);
            println!("Slides:  {}", deck.total_slides);
            println!("\nOutput files:");
            println!("  {}", json_path.display());
            println!("  {}", summary_path.display());
            Ok(())
        }
        Commands::Parse { proposal } => {
            let doc = parser::ProposalDoc::load(&proposal)?;
            let info = parser::extract::project::build_info(&doc);
            let wrapper = model::ProjectInfoDoc { project_info: info };
            println!("{}", serde_json::to_string_pretty(&wrapper)?);
            Ok(())
        }
        Commands::Update {
            checklist: checklist_file,
            template,
            output,
        } => {
            println!("Reading checklist: {}", checklist_file.display());
            println!("Reading template:  {}", template.display());

            let report =
                checklist::update_template(&checklist_file, &template, output.as_deref())?;
            println!();
            report.print();
            println!("\nNext step: run 'check-template' to verify all placeholders are gone");
            Ok(())
        }
        Commands::CheckChecklist {
            checklist: checklist_file,
            template,
        } => {
            println!(
                "Validating checklist completion: {}",
                checklist_file.display()
            );
            if let Some(template) = &template {
                println!("Cross-referencing template: {}", template.display());
            }

            let findings = validate::checklist_completion(&checklist_file, template.as_deref())?;
            findings.print();
            if !findings.ok() {
                println!(
                    "\nChecklist is NOT complete: {} error(s) found",
                    findings.errors.len()
                );
                println!("Presale team must fill all answers before proceeding.");
                process::exit(1);
            }
            if findings.warnings.is_empty() {
                println!("\nChecklist is complete, all placeholders have presale answers");
            } else {
                println!(
                    "\nAll placeholders have presale answers ({} warning(s), review recommended)",
                    findings.warnings.len()
                );
            }
            Ok(())
        }
        Commands::CheckTemplate { template } => {
            println!(
                "Validating template for remaining placeholders: {}",
                template.display()
            );

            let findings = validate::no_placeholders(&template)?;
            findings.print();
            if !findings.ok() {
                println!(
                    "\nTemplate still contains {} placeholder(s)",
                    findings.errors.len()
                );
                println!("Do not proceed until the checklist is applied and all IDs are resolved.");
                process::exit(1);
            }
            println!("\nTemplate is ready, no placeholders remaining");
            Ok(())
        }
        Commands::Verify { structure } => {
            let findings = validate::verify_deck(&structure)?;
            findings.print();
            if !findings.ok() {
                println!(
                    "\n{} error(s) found in {}",
                    findings.errors.len(),
                    structure.display()
                );
                process::exit(1);
            }
            println!("All checks passed: {}", structure.display());
            Ok(())
        }
    }
}
