use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use rmq_bench::{
    generate, loader,
    report::{self, ReportKind},
    session,
    timing::Logs,
    Model,
};

#[derive(clap::Parser)]
struct Args {
    #[clap(subcommand)]
    command: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Build one RMQ model over an integer file and answer `Q l r` / `U i v` commands.
    Run {
        /// Whitespace separated non-negative integers.
        file: PathBuf,
        #[clap(short, long, value_enum, default_value_t = Model::SegmentDynamic)]
        model: Model,
        /// Read commands from this file instead of stdin.
        #[clap(short, long)]
        commands: Option<PathBuf>,
        /// Directory the CSV timing logs are appended to.
        #[clap(long, default_value = ".")]
        log_dir: PathBuf,
        #[clap(long)]
        no_log: bool,
        /// Print the loaded array.
        #[clap(short, long)]
        print: bool,
    },
    /// Write `dataset_<n>.txt` files of random integers.
    GenData {
        #[clap(long, num_args = 1.., default_values_t = [1000, 2000, 3000, 4000, 5000])]
        sizes: Vec<usize>,
        #[clap(long, default_value_t = 9999)]
        max: u64,
        #[clap(long, default_value_t = 0)]
        seed: u64,
        #[clap(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write `commands_<n>.txt` (queries and updates) or `commands_static_<n>.txt` (queries only).
    GenCommands {
        #[clap(long, num_args = 1.., default_values_t = [1000, 2000, 3000, 4000, 5000])]
        sizes: Vec<usize>,
        #[clap(long, default_value_t = 100)]
        queries: usize,
        #[clap(long, default_value_t = 30)]
        updates: usize,
        #[clap(long, default_value_t = 9999)]
        max: u64,
        #[clap(long, default_value_t = 0)]
        seed: u64,
        #[clap(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Only queries, written as bare `l r` lines.
        #[clap(long)]
        static_only: bool,
    },
    /// Summarize the timing logs as LaTeX.
    Report {
        #[clap(value_enum)]
        kind: ReportKind,
        #[clap(long, default_value = ".")]
        log_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Cmd::Run {
            file,
            model,
            commands,
            log_dir,
            no_log,
            print,
        } => {
            let mut a = loader::load(&file)
                .with_context(|| format!("could not load {}", file.display()))?;
            if print {
                println!("Loaded array ({} elements):\nA = {a}\n", a.len());
            }
            let mut logs = if no_log {
                Logs::disabled()
            } else {
                Logs::open(&log_dir, model)
                    .with_context(|| format!("could not open logs in {}", log_dir.display()))?
            };
            let stdout = io::stdout().lock();
            let summary = match commands {
                Some(path) => {
                    let input = File::open(&path)
                        .with_context(|| format!("could not open {}", path.display()))?;
                    session::start(model, &mut a, BufReader::new(input), stdout, &mut logs)?
                }
                None => session::start(model, &mut a, io::stdin().lock(), stdout, &mut logs)?,
            };
            log::info!(
                "{} queries, {} updates, {} rejected",
                summary.queries,
                summary.updates,
                summary.rejected
            );
        }
        Cmd::GenData {
            sizes,
            max,
            seed,
            out_dir,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            fs::create_dir_all(&out_dir)?;
            for n in sizes {
                let path = out_dir.join(format!("dataset_{n}.txt"));
                generate::write_dataset(&path, &generate::dataset(&mut rng, n, max))?;
                log::info!("Wrote {} with {n} integers", path.display());
            }
        }
        Cmd::GenCommands {
            sizes,
            queries,
            updates,
            max,
            seed,
            out_dir,
            static_only,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            fs::create_dir_all(&out_dir)?;
            for n in sizes {
                anyhow::ensure!(n > 0, "array sizes must be positive");
                let (path, script) = if static_only {
                    (
                        out_dir.join(format!("commands_static_{n}.txt")),
                        generate::static_commands(&mut rng, n, queries),
                    )
                } else {
                    (
                        out_dir.join(format!("commands_{n}.txt")),
                        generate::commands(&mut rng, n, queries, updates, max),
                    )
                };
                generate::write_commands(&path, &script, static_only)?;
                log::info!("Wrote {} with {} commands", path.display(), script.len());
            }
        }
        Cmd::Report { kind, log_dir } => {
            println!("{}", report::render(kind, &log_dir)?);
        }
    }
    Ok(())
}
