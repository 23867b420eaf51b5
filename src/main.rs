fn main() -> Result<(), Box<dyn std::error::Error>> {
    pricefx::cli::main()
}
