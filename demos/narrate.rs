use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use narration_rs::{
    catalog::Language, Dispatcher, EngineId, SynthesisConfig, SynthesisOutcome,
    SynthesisRequestBuilder,
};

/// Turn text into an MP3 clip with Gemini or Google Cloud TTS.
#[derive(Parser, Debug)]
#[command(name = "narrate")]
struct Args {
    /// Text to speak
    text: String,

    /// Engine: "gemini" or "cloud-tts"
    #[arg(long, default_value = "gemini")]
    engine: EngineId,

    /// Language name or code (English, Hindi, Telugu)
    #[arg(long, default_value = "English")]
    language: Language,

    /// Cloud TTS voice; defaults to the language's first voice
    #[arg(long)]
    voice: Option<String>,

    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f32,

    /// Optional JSON config file; otherwise GOOGLE_API_KEY is used
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the MP3 is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// List languages and their voices, then exit
    #[arg(long)]
    list_voices: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.list_voices {
        for language in Language::ALL {
            println!("{language} ({}): {}", language.code(), language.voices().join(", "));
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SynthesisConfig::from_json_file(path)?,
        None => SynthesisConfig::from_env()?,
    };
    let dispatcher = Dispatcher::new(&config)?;

    let mut builder = SynthesisRequestBuilder::default();
    builder
        .text(args.text)
        .engine(args.engine)
        .language(args.language.code())
        .speed(args.speed)
        .pitch(args.pitch);
    if let Some(voice) = args.voice {
        builder.voice(voice);
    }
    let request = builder.build()?;

    let start = Instant::now();
    match dispatcher.dispatch(&request) {
        SynthesisOutcome::Audio(mp3) => {
            let path = args.out_dir.join(request.engine.output_file_name());
            std::fs::write(&path, &mp3)?;
            println!(
                "Speech generated successfully in {:.2?}: {} bytes saved to {}",
                start.elapsed(),
                mp3.len(),
                path.display()
            );
            Ok(())
        }
        SynthesisOutcome::Failure { kind, message } => {
            eprintln!("Error ({kind}): {message}");
            std::process::exit(1);
        }
    }
}
