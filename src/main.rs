// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use clap::Parser;

/// Inline the library functions a shell script needs into the script itself.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Main script file.
    script: String,
}

fn main() -> Result<()> {
    // Parse arguments; a missing script path is a usage error.
    let cli = Cli::parse();

    let mut engine = shpack::Engine::new();
    let output = engine.expand_file(&cli.script)?;
    print!("{output}");

    Ok(())
}
