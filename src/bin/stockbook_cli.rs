use std::process::ExitCode;

fn main() -> ExitCode {
    stockbook::init();
    match stockbook::cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
