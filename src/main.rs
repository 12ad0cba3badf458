fn main() {
    if let Err(e) = cropcare_lib::run() {
        tracing::error!("Fatal: {e}");
        eprintln!("cropcare: {e}");
        std::process::exit(1);
    }
}
