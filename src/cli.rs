//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Download all images from a website and export the image links.
#[derive(Parser, Debug)]
#[command(name = "imgrab")]
#[command(author, version, about)]
pub struct Args {
    /// Website URL
    pub url: String,

    /// Directory to save images (default: derived from the URL's host)
    pub directory: Option<String>,

    /// Maximum concurrent downloads (0 = no limit)
    #[arg(short = 'c', long, default_value_t = 0, value_parser = clap::value_parser!(u16))]
    pub concurrency: u16,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// `None` when downloads should fan out without a cap.
    #[must_use]
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.concurrency > 0).then(|| usize::from(self.concurrency))
    }
}
