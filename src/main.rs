fn main() -> Result<(), Box<dyn std::error::Error>> {
    charade::cli::main()
}
