use rs_markov_core::{Engine, EngineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // First argument: a text corpus, one sentence per line
    // Second argument: where to keep the learned table (".bin" for postcard)
    let mut args = std::env::args().skip(1);
    let corpus = args.next().unwrap_or_else(|| "./data/corpus.txt".to_owned());
    let snapshot = args.next().unwrap_or_else(|| "./data/Dict1.json".to_owned());

    // Save after every training event so the corpus is only learned once
    let mut config = EngineConfig::with_snapshot(&snapshot);
    config.flush_threshold = 1;

    // Load the previous table if it exists, start empty otherwise
    let mut engine = Engine::open(config)?;
    println!("Loaded {} words from {}", engine.table().len(), snapshot);

    // Without any training, the engine answers with its untrained message
    if engine.table().is_empty() {
        println!("Before training: {}", engine.generate());
    }

    // Bulk training is spread over worker threads
    let trained = engine.train_corpus(&corpus)?;
    println!("Trained {} lines from {}", trained, corpus);

    // Single messages can be learned too, exactly as a chat bot would
    engine.train("hello world\nhow are you");

    // Blank messages are ignored
    if !engine.train("   \n\n") {
        println!("Blank message ignored");
    }

    println!("{:?}", engine.stats());

    // Generate 10 sentences
    for i in 0..10 {
        println!("Generated sentence {}: {}", i + 1, engine.generate());
    }

    if !engine.flush_now() {
        println!("Could not save {}", snapshot);
    }

    Ok(())
}
