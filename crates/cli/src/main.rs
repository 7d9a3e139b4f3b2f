use std::process::ExitCode;

fn main() -> ExitCode {
    quotedraft_cli::run()
}
