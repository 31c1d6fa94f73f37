use clap::Parser;
use headline_gen_core::model::bigram_model::BigramModel;
use headline_gen_core::read_lines;
use headline_gen_core::model::config::{GenerationConfig, ModelConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Train a bigram model on headlines, generate new ones and score held-out text.
#[derive(Parser, Debug)]
#[command(name = "headline-gen-demo")]
struct Args {
    /// Training corpus, one headline per line
    #[arg(long, default_value = "./data/train.txt")]
    train: String,

    /// Held-out corpus used for perplexity
    #[arg(long)]
    test: Option<String>,

    /// Additive smoothing constant (> 0)
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Words seen at most this many times collapse into <unk>
    #[arg(long, default_value_t = 1)]
    min_freq: usize,

    /// Number of headlines to generate
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Retries when a generated headline already exists in the training set
    #[arg(long, default_value_t = 10)]
    nb_try: usize,

    /// Optional cap on generated words
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Extra smoothing constants to compare on the held-out corpus
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Configuration errors stop the run before any counting
    let config = ModelConfig::new(args.alpha, args.min_freq)?;
    let mut generation = GenerationConfig::default();
    generation.nb_try = args.nb_try;
    generation.set_max_tokens(args.max_tokens)?;

    // Train, or load the cached model next to the corpus (.bin)
    let mut model = BigramModel::from_file(&args.train, config)?;
    println!(
        "Vocabulary: {} tokens, {} training headlines",
        model.vocabulary().len(),
        model.headline_count()
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    for i in 0..args.count {
        let headline = model.generate(&mut rng, &generation)?;
        let marker = if model.exists(&headline) { " (already in corpus)" } else { "" };
        println!("Generated headline {}: {}{}", i + 1, headline, marker);
    }

    let Some(test) = args.test else {
        return Ok(());
    };
    let lines = read_lines(&test)?;

    println!("Perplexity (alpha = {}): {:.2}", model.config().alpha(), model.perplexity(&lines)?);

    // Same counts, different smoothing: only the estimator changes
    for alpha in args.sweep {
        model.set_alpha(alpha)?;
        println!("Perplexity (alpha = {}): {:.2}", alpha, model.perplexity(&lines)?);
    }

    Ok(())
}
