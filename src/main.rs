//! Field Sim entry point
//!
//! Runs a program (or a catalog challenge) headlessly and prints the final
//! state as JSON, or checks a program against a lesson exercise. The browser
//! build exposes `FieldSimulator` instead.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::{fs, io};

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use field_sim::challenges::{self, Challenge};
    use field_sim::{Settings, Simulator, lessons};

    /// Run pseudo-Java robot programs on a simulated field.
    #[derive(Debug, Parser)]
    #[command(name = "field-sim", version)]
    pub struct Cli {
        /// Program source file, or `-` to read stdin
        source: Option<PathBuf>,

        /// Settings JSON file (frame interval, frame limit, start state)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Run a catalog challenge and validate its final state
        #[arg(long, value_name = "ID", conflicts_with_all = ["source", "lesson"])]
        challenge: Option<String>,

        /// Run the challenge's solution instead of its starter code
        #[arg(long, requires = "challenge")]
        solution: bool,

        /// Check the source against a lesson exercise instead of running it.
        /// Without a source the exercise's starter code is checked.
        #[arg(long, value_name = "ID")]
        lesson: Option<String>,

        /// List challenges and lessons
        #[arg(long, conflicts_with_all = ["source", "challenge", "lesson"])]
        list: bool,
    }

    fn list() {
        println!("challenges:");
        for c in challenges::catalog() {
            println!(
                "  {:<4} {:<24} {:?}, {} pts",
                c.id, c.title, c.difficulty, c.points
            );
        }
        println!("  total: {} pts", challenges::total_points());
        println!("lessons:");
        for id in lessons::lesson_ids() {
            println!("  {:<4} {}", id, lessons::exercise(id).title);
        }
    }

    fn read_source(path: &Path) -> Result<String> {
        if path == Path::new("-") {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            return Ok(source);
        }
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn check_lesson(lesson_id: &str, source: Option<&Path>) -> Result<ExitCode> {
        let code = match source {
            Some(path) => read_source(path)?,
            None => lessons::exercise(lesson_id).starter_code.to_string(),
        };
        let report = lessons::run_checks(lesson_id, &code)?;
        println!("{}", serde_json::to_string_pretty(&report)?);

        for result in report.results.iter().filter(|r| !r.pass) {
            eprintln!("FAIL {}: {}", result.label, result.hint);
        }
        if report.all_passed {
            eprintln!("PASS {}: {}", lesson_id, report.exercise.success_message);
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }

    pub fn run(cli: Cli) -> Result<ExitCode> {
        if cli.list {
            list();
            return Ok(ExitCode::SUCCESS);
        }
        if let Some(lesson_id) = &cli.lesson {
            return check_lesson(lesson_id, cli.source.as_deref());
        }

        let (source, challenge): (String, Option<&Challenge>) = match (&cli.challenge, &cli.source)
        {
            (Some(id), _) => {
                let challenge =
                    challenges::find(id).with_context(|| format!("No challenge named {id}"))?;
                let code = if cli.solution {
                    challenge.solution_code
                } else {
                    challenge.starter_code
                };
                (code.to_string(), Some(challenge))
            }
            (None, Some(path)) => (read_source(path)?, None),
            (None, None) => bail!("Nothing to run: pass a source file, `-`, --challenge or --list"),
        };

        let settings = Settings::load(cli.settings.as_deref());
        let mut sim = Simulator::new(settings.initial.clone());
        let state = match sim.run_to_completion(&source, &settings) {
            Ok(state) => state,
            Err(e) => {
                // Parse errors still leave a state worth printing
                println!("{}", serde_json::to_string_pretty(sim.state())?);
                return Err(anyhow::Error::new(e).context("Run failed"));
            }
        };
        println!("{}", serde_json::to_string_pretty(&state)?);

        if let Some(challenge) = challenge {
            let verdict = challenge.check(&state);
            let mark = if verdict.success { "PASS" } else { "FAIL" };
            eprintln!("{} {}: {}", mark, challenge.id, verdict.message);
            if !verdict.success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Ok(ExitCode::SUCCESS)
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    match cli::run(cli::Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `field_sim::platform::FieldSimulator`
}
