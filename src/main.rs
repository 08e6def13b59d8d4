use std::{
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Parser, Subcommand};
use hmmtagger::{
    dataset::{self, read_sentences, write_tagged},
    Dataset, Evaluation, HmmModel, Options, Result,
};

#[derive(Debug, Parser)]
#[command(version, about = "Bigram HMM part-of-speech tagger")]
#[command(propagate_version = true)]
struct Argv {
    /// more logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// read training and smoothing options from a JSON file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// set an option, e.g. -p train.denoising=1
    #[arg(short, global = true, value_name = "NAME=VALUE")]
    parameters: Vec<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate transition and emission tables from a tagged corpus
    Train {
        corpus: PathBuf,
        transitions: PathBuf,
        emissions: PathBuf,
        /// file numbers, truncations and links under CARD, TRUNC and XY
        #[arg(long)]
        denoising: bool,
        /// also write the model as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// Tag an untagged file (one token per line) with a stored model
    Tag {
        transitions: PathBuf,
        emissions: PathBuf,
        input: PathBuf,
        output: PathBuf,
        /// decode with the emission table as stored
        #[arg(long)]
        no_smooth: bool,
    },
    /// Compare a tagged file against a reference and write the differences
    Eval {
        reference: PathBuf,
        candidate: PathBuf,
        diff: PathBuf,
    },
    /// Train, tag and evaluate in one run
    TrainTagEval {
        corpus: PathBuf,
        transitions: PathBuf,
        emissions: PathBuf,
        input: PathBuf,
        output: PathBuf,
        reference: PathBuf,
        diff: PathBuf,
        #[arg(long)]
        denoising: bool,
    },
}

fn options(argv: &Argv) -> Result<Options> {
    let mut opts = match &argv.config {
        Some(path) => Options::from_path(path)?,
        None => Options::default(),
    };
    for param in &argv.parameters {
        opts.apply(param)?;
    }
    Ok(opts)
}

fn train(opts: &Options, corpus: &Path, transitions: &Path, emissions: &Path) -> Result<HmmModel> {
    let ds = Dataset::from_path(corpus)?;
    let model = hmmtagger::train(&ds, opts.train.clone());
    model.save_tables(transitions, emissions)?;
    Ok(model)
}

fn tag(model: &HmmModel, input: &Path, output: &Path) -> Result<()> {
    let begin = Instant::now();
    let f = dataset::open_file(input)?;
    let sentences = read_sentences(BufReader::new(f))?;
    let tagger = model.tagger();
    let mut writer = BufWriter::new(dataset::create_file(output)?);
    let mut num_degenerate = 0;
    for sentence in &sentences {
        let decoded = tagger.decode(sentence.as_slice());
        if decoded.is_degenerate() {
            num_degenerate += 1;
            log::debug!("no tag sequence for {:?}", sentence);
        }
        write_tagged(&mut writer, &decoded.tokens)?;
    }
    writer.flush()?;
    log::info!(
        "tagged {} sentences ({} without a path) into {}, time cost: {:?}",
        sentences.len(),
        num_degenerate,
        output.display(),
        begin.elapsed()
    );
    Ok(())
}

fn eval(reference: &Path, candidate: &Path, diff: &Path) -> Result<()> {
    let evaluation = Evaluation::from_paths(candidate, reference)?;
    evaluation.save_diff(diff)?;
    println!("{}", evaluation);
    Ok(())
}

fn run(argv: Argv) -> Result<()> {
    let mut opts = options(&argv)?;
    match argv.command {
        Command::Train {
            corpus,
            transitions,
            emissions,
            denoising,
            json,
        } => {
            opts.train.denoising |= denoising;
            let model = train(&opts, &corpus, &transitions, &emissions)?;
            if let Some(path) = json {
                model.save_json(path)?;
            }
        }
        Command::Tag {
            transitions,
            emissions,
            input,
            output,
            no_smooth,
        } => {
            let mut model = HmmModel::from_tables(transitions, emissions)?;
            if !no_smooth {
                model.smooth(&opts.smooth);
            }
            tag(&model, &input, &output)?;
        }
        Command::Eval {
            reference,
            candidate,
            diff,
        } => eval(&reference, &candidate, &diff)?,
        Command::TrainTagEval {
            corpus,
            transitions,
            emissions,
            input,
            output,
            reference,
            diff,
            denoising,
        } => {
            opts.train.denoising |= denoising;
            train(&opts, &corpus, &transitions, &emissions)?;
            let mut model = HmmModel::from_tables(&transitions, &emissions)?;
            model.smooth(&opts.smooth);
            tag(&model, &input, &output)?;
            eval(&reference, &output, &diff)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("argv: {:?}", argv);

    match run(argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
