use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use repo_map::config::{self, MapConfig, RetryPolicy, DEFAULT_ENDPOINT, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(name = "repo-map")]
#[command(about = "Generate a structured summary of a software repository")]
#[command(version)]
#[command(after_long_help = r#"
The map is written to <dirname>_repo_map.md inside the repository, next to a
.repo_map_structure.json snapshot and the .repo-map-cache.db cache.

Python is parsed fully. Java, JavaScript, TypeScript and C# are scanned with
line patterns; other recognized languages contribute documentation only.

EXAMPLES:
    # Map a repository without the confirmation prompt
    repo-map ./my-project --yes

    # Skip the enrichment step
    repo-map ./my-project -y --no-enrich

    # Use another OpenAI-compatible endpoint and model
    REPO_MAP_API_KEY=... repo-map ./my-project --endpoint http://localhost:8080/v1 --model llama3
"#)]
pub struct Cli {
    /// Path to the repository to be summarized
    pub repository_path: PathBuf,

    /// Accept the disclaimer and proceed without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Model used to generate descriptions
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Do not call the enrichment service
    #[arg(long)]
    pub no_enrich: bool,

    /// Cache database; relative paths are resolved inside the repository
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Attempts per file before enrichment gives up
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,
}

impl Cli {
    pub fn to_config(&self) -> MapConfig {
        let defaults = MapConfig::default();
        MapConfig {
            cache_file: self.cache.clone().unwrap_or(defaults.cache_file.clone()),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            api_key: config::resolve_api_key(),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
            enrich: !self.no_enrich,
            ..defaults
        }
    }
}

const DISCLAIMER: &str = "repo-map: A tool to generate a structured summary of a software repository.\n\
This tool uses the .gitignore files in the target directory to decide which files to leave out of the map.\n";
const PROMPT: &str = "Do you want to proceed? [y/n]: ";

/// Asks until the answer is recognizable. Empty input accepts; end of input declines.
pub fn confirm_disclaimer<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    output.write_all(DISCLAIMER.as_bytes())?;

    loop {
        output.write_all(PROMPT.as_bytes())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Invalid input. Please enter 'y' or 'n'.")?,
        }
    }
}
