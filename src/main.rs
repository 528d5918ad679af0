fn main() {
    if let Err(err) = schema_flow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
