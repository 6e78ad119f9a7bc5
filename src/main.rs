// src/main.rs

use sprout::types::Outcome;
use sprout::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("sprout error: {err:?}");
        std::process::exit(1);
    }

    match run(args).await {
        Ok(Outcome::Message(message)) => println!("{message}"),
        Ok(_) => {}
        Err(err) => {
            // Validation and test failures are expected outcomes, not crashes.
            if err.is_silent() {
                eprintln!("{err}");
            } else {
                eprintln!("sprout error: {err:?}");
            }
            std::process::exit(err.exit_code());
        }
    }
}
