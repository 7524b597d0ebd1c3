use std::process::ExitCode;

fn main() -> ExitCode {
    orderdesk_cli::run()
}
