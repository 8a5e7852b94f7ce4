fn main() {
    let code = typeweave_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
