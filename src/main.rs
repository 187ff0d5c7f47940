fn main() -> Result<(), Box<dyn std::error::Error>> {
    codeaid::cli::main()
}
