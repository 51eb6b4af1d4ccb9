use std::process::ExitCode;

fn main() -> ExitCode {
    lumopack_cli::run()
}
