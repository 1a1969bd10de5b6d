use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    dggterm::cli::main()
}
