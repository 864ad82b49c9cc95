fn main() {
    if let Err(err) = statscatter::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
