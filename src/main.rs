use clap::Parser;
use monkey::Program;
use monkey::cli::{AppConfig, Args, Commands, generate_completions};
use monkey::interpreter::{Interpreter, ParserError};
use monkey::lexer::Lexer;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

const PROMPT: &str = ">> ";

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);

    verbose_log(&config, "Starting monkey");

    if let Some(script) = &args.script {
        verbose_log(
            &config,
            &format!("Reading script from file: {}", script.display()),
        );
        let source = match read_file(script) {
            Ok(source) => source,
            Err(e) => {
                error_message(&config, &e);
                std::process::exit(1);
            }
        };
        run_source(&source, &config);
    } else if let Some(source) = &args.eval {
        verbose_log(&config, "Evaluating source from command-line argument");
        run_source(source, &config);
    } else {
        run_repl(&config);
    }
}

/// Runs a complete source text once, printing the final value. Exits
/// non-zero on parse or runtime failure.
fn run_source(source: &str, config: &AppConfig) {
    let (program, errors) = parse_source(source);
    if !errors.is_empty() {
        print_parser_errors(config, &errors);
        std::process::exit(1);
    }

    verbose_log(
        config,
        &format!("Parsed {} statements", program.statements.len()),
    );

    let mut interpreter = Interpreter::new();
    match interpreter.run(&program) {
        Ok(Some(value)) => println!("{}", value.inspect()),
        Ok(None) => {}
        Err(error) => {
            error_message(config, &format!("ERROR: {}", error));
            std::process::exit(1);
        }
    }
}

fn run_repl(config: &AppConfig) {
    let user = std::env::var("USER").unwrap_or_else(|_| "there".to_string());
    println!("Hello {}! This is the Monkey programming language REPL!", user);
    println!("Feel free to type in some code!");

    let stdin = io::stdin();
    let mut interpreter = Interpreter::new();

    loop {
        print!("{}", PROMPT);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let (program, errors) = parse_source(&line);
        if !errors.is_empty() {
            print_parser_errors(config, &errors);
            continue;
        }

        // Bindings live in the interpreter's environment across lines.
        match interpreter.run(&program) {
            Ok(Some(value)) => println!("{}", value.inspect()),
            Ok(None) => {}
            Err(error) => error_message(config, &format!("ERROR: {}", error)),
        }
    }
}

fn parse_source(source: &str) -> (Program, Vec<ParserError>) {
    let mut parser = monkey::interpreter::Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    let errors = parser.errors().to_vec();
    (program, errors)
}

/// Prints up to the first ten parser errors, numbered, and notes omission
/// of the rest.
fn print_parser_errors(config: &AppConfig, errors: &[ParserError]) {
    error_message(config, &format!("parser has {} errors:", errors.len()));
    for (index, error) in errors.iter().enumerate() {
        if index >= 10 {
            eprintln!("(omitting more errors)");
            break;
        }
        eprintln!("{:3}: {}", index + 1, error);
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[monkey:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
