use std::env;
use std::io;

use anyhow::Result;
use file2table::{LoadError, run};

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let mut stdout = io::stdout().lock();

    match run(&args, &mut stdout) {
        Err(LoadError::Args(e)) => e.exit(),
        result => Ok(result?),
    }
}
