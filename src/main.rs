fn main() {
    if let Err(err) = gear_catalog::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
