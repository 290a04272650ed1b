//! Console entry point for crew operations
//!
//! `run` conducts a one-shot assessment from a single line of input;
//! `train`, `replay`, and `test` exercise the crew outside the chat UI.

use compass::crew::{Crew, CrewError, CrewService, KickoffInputs};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "Usage: compass-cli <command> [<args>]

Commands:
  run                      interactive console assessment
  train <n> <file>         run n training iterations, write transcript to file
  replay <task_id>         re-run a stored kickoff by task ID
  test <n> <model>         run n timed iterations against a specific model";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compass=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let result = match command.as_str() {
        "run" => run().await,
        "train" => train(&args).await,
        "replay" => replay(&args).await,
        "test" => test(&args).await,
        other => {
            eprintln!("Unknown command: {other}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Conduct the whole assessment in one kickoff, seeded from a single line
async fn run() -> Result<(), CrewError> {
    println!("\n=== Compass Psychological Assessment ===\n");
    println!("Welcome! This is an interactive conversation to understand your concerns.");
    println!("To get started, please share your name and initial concerns.");
    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let mut initial_input = line.trim().to_string();

    if initial_input.is_empty() {
        initial_input = "Patient requested general psychological assessment".to_string();
    }

    println!("\n{}", "=".repeat(60));
    println!("STARTING INTERACTIVE DIAGNOSTIC ASSESSMENT");
    println!("{}\n", "=".repeat(60));

    let crew = Crew::from_env()?;
    let output = crew.kickoff(&KickoffInputs::initial(initial_input)).await?;
    println!("{}", output.text());
    Ok(())
}

async fn train(args: &[String]) -> Result<(), CrewError> {
    let (iterations, path) = match (args.get(2), args.get(3)) {
        (Some(n), Some(path)) => match n.parse::<u32>() {
            Ok(iterations) => (iterations, path),
            Err(_) => return usage_error(),
        },
        _ => return usage_error(),
    };

    let crew = Crew::from_env()?;
    crew.train(iterations, Path::new(path), &KickoffInputs::sample())
        .await?;
    println!("Wrote {iterations} training iterations to {path}");
    Ok(())
}

async fn replay(args: &[String]) -> Result<(), CrewError> {
    let Some(task_id) = args.get(2) else {
        return usage_error();
    };

    let crew = Crew::from_env()?;
    let output = crew.replay(task_id).await?;
    println!("{}", output.text());
    Ok(())
}

async fn test(args: &[String]) -> Result<(), CrewError> {
    let (iterations, model) = match (args.get(2), args.get(3)) {
        (Some(n), Some(model)) => match n.parse::<u32>() {
            Ok(iterations) => (iterations, model),
            Err(_) => return usage_error(),
        },
        _ => return usage_error(),
    };

    let crew = Crew::from_env()?;
    let results = crew
        .test(iterations, model, &KickoffInputs::sample())
        .await?;
    for result in results {
        println!(
            "iteration {}: task {} in {} ms",
            result.iteration, result.task_id, result.duration_ms
        );
    }
    Ok(())
}

fn usage_error() -> Result<(), CrewError> {
    eprintln!("{USAGE}");
    Err(CrewError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "invalid arguments",
    )))
}
