//! # photon CLI
//!
//! Command-line interface for the asset optimizer.
//!
//! ## Usage
//! ```bash
//! photon ./assets --out ./dist --quality 75 --webp
//! photon ./assets --replace --ignore node_modules,dist --min-size 10kb
//! ```

mod cli;

use photon_optimizer::Result;

fn main() -> Result<()> {
    cli::run()
}
