use std::process::ExitCode;

fn main() -> ExitCode {
    event_scout_lib::run()
}
