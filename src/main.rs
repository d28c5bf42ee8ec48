fn main() {
    if let Err(e) = mineral_rs::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
