use std::process;

fn main() {
    if let Err(e) = rsdk::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
