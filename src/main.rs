use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use git_churn::{Churn, GitRepo, Repo, RepoError};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "git-churn")]
#[command(about = "Group hunks and classify whitespace-only line changes in git commits")]
struct Cli {
    /// Repository root
    #[arg(short = 'C', long = "repo", default_value = ".", global = true)]
    repo: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List commits with the status of each changed file
    Log {
        /// Branch or reference to list commits from (default: HEAD)
        #[arg(short, long)]
        branch: Option<String>,
        /// Maximum number of commits to list
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },
    /// Show the grouped and classified diff of a commit
    Show {
        /// Commit to analyze
        #[arg(default_value = "HEAD")]
        revision: String,
        /// Only analyze these files
        #[arg(short, long)]
        file: Vec<String>,
    },
    /// Show the hunk groups holding selected hunks (e.g. "src/lib.rs:2..3")
    Hunks {
        /// Commit to analyze
        revision: String,
        /// File and 1-based hunk numbers or ranges
        selector: String,
    },
    /// Print shell completions
    Completions { shell: Shell },
    /// Print a roff man page
    Man,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open(repo: &Path) -> Result<Churn<GitRepo>, RepoError> {
    Ok(Churn::new(GitRepo::open(repo)?))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Log { branch, max_count } => {
            let mut churn = open(&cli.repo)?;
            if let Some(branch) = branch {
                churn.repo_mut().set_branch(&branch)?;
            }
            for entry in churn.log(max_count)? {
                print!("{}", entry.commit);
                for file in &entry.files {
                    println!("{file}");
                }
                println!();
            }
        }
        Commands::Show { revision, file } => {
            let diff = open(&cli.repo)?.analyze(&revision, &file)?;
            print!("{diff}");
            println!("total: {}", diff.summary());
        }
        Commands::Hunks { revision, selector } => {
            print!("{}", open(&cli.repo)?.hunk_groups(&revision, &selector)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "git-churn", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}
