fn main() {
    if let Err(e) = sweepbench_cli::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
