use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;
use wepcrack::{crack, synth, write_capture, Capture, CrackerConfig, Error};

#[derive(Args, Debug, Clone, Copy)]
struct ConfigArgs {
    /// Size of the cipher state (N)
    #[arg(long, default_value_t = wepcrack::KEY_SPACE)]
    key_space: usize,

    /// Number of IV bytes in front of every key
    #[arg(long, default_value_t = wepcrack::IV_SIZE)]
    iv_size: usize,

    /// Exclusive upper bound of every secret key byte
    #[arg(long, default_value_t = wepcrack::MAX_KEY_VALUE)]
    max_key_value: usize,

    /// Candidates tried per voted key byte
    #[arg(long, default_value_t = wepcrack::KEY_BOUND)]
    key_bound: usize,

    /// Trailing key bytes to brute force
    #[arg(long, default_value_t = wepcrack::BRUTE_FORCE_LEN)]
    brute_force_len: usize,

    /// Consecutive matching samples needed to accept a key
    #[arg(long, default_value_t = wepcrack::THRESHOLD)]
    threshold: usize,
}

impl From<ConfigArgs> for CrackerConfig {
    fn from(args: ConfigArgs) -> Self {
        CrackerConfig::default()
            .with_key_space(args.key_space)
            .with_iv_size(args.iv_size)
            .with_max_key_value(args.max_key_value)
            .with_key_bound(args.key_bound)
            .with_brute_force_len(args.brute_force_len)
            .with_threshold(args.threshold)
    }
}

#[derive(Parser, Debug)]
struct ActionCrack {
    /// Capture files to recover keys from
    #[arg(index = 1, required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct ActionGenerate {
    /// Output capture path
    #[arg(index = 1)]
    output: PathBuf,

    /// Secret key bytes, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    key: Vec<u8>,

    /// Extra samples with random IVs
    #[arg(short, long, default_value_t = 0)]
    random: usize,

    /// Seed for the random IVs
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Recover keys from capture files
    Crack(ActionCrack),
    /// Write a synthetic capture for a known key
    Generate(ActionGenerate),
}

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Log search progress
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.action {
        Action::Crack(args) => crack_files(args),
        Action::Generate(args) => generate(args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn crack_files(args: ActionCrack) -> Result<ExitCode, Error> {
    let config = CrackerConfig::from(args.config);
    let mut code = ExitCode::SUCCESS;
    for file in &args.files {
        let name = file.display();
        let capture = match Capture::open(file, config.iv_size) {
            Ok(capture) => capture,
            Err(e) => {
                eprintln!("could not read {name}: {e}");
                code = ExitCode::FAILURE;
                continue;
            }
        };
        match crack(&capture.samples, capture.total_key_length, &config) {
            Ok(Some(key)) => {
                let key = key.iter().map(|b| b.to_string()).collect::<Vec<_>>();
                println!("Filename: {name}");
                println!("Key\t: {}", key.join(" "));
            }
            Ok(None) => println!("Failed to find key for {name}"),
            Err(e) => {
                eprintln!("could not crack {name}: {e}");
                code = ExitCode::FAILURE;
            }
        }
    }
    Ok(code)
}

fn generate(args: ActionGenerate) -> Result<ExitCode, Error> {
    let config = CrackerConfig::from(args.config);
    let total_key_length = config.iv_size + args.key.len();
    config.check(total_key_length)?;
    if let Some(&b) = args.key.iter().find(|&&b| b as usize >= config.max_key_value) {
        return Err(Error::Config(format!(
            "key byte {b} is not below the max key value {}",
            config.max_key_value
        )));
    }

    let mut samples = synth::weak_samples(&args.key, &config)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    for sample in &synth::random_samples(&args.key, args.random, &config, &mut rng) {
        samples.insert(sample.clone());
    }

    let mut writer = BufWriter::new(File::create(&args.output)?);
    write_capture(&mut writer, total_key_length, &samples)?;
    writer.flush()?;
    println!(
        "wrote {} samples for a {total_key_length} byte key to {}",
        samples.len(),
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}
