use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    stepnames::apps::run_build_name_dataset(std::env::args().skip(1))
}
