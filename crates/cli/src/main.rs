use std::process::ExitCode;

fn main() -> ExitCode {
    cartlens_cli::run()
}
