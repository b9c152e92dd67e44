use std::process::ExitCode;

use packmeter::{bench, standard_pipelines, Payload, Result, Schema};

const DEFAULT_PAYLOAD: &str = "payload.json";
const DEFAULT_SCHEMA: &str = "schema.proto";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let payload_path = args.next().unwrap_or_else(|| DEFAULT_PAYLOAD.to_string());
    let schema_path = args.next().unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

    let payload = Payload::load(&payload_path)?;
    let schema = Schema::from_file(&schema_path)?;
    log::info!(
        "benchmarking {} records from {} against {}",
        payload.len(),
        payload_path,
        schema_path
    );

    let report = bench::run(&payload, &standard_pipelines(&schema))?;
    print!("{}", report);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
