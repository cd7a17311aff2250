use clap::Parser;
use clap::error::ErrorKind;
use mori::{build, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mori")]
#[command(about = "Static site builder: Markdown pages in one shared HTML template")]
#[command(long_about = "\
Static site builder: Markdown pages in one shared HTML template

The source directory is copied into the build directory, then every
top-level Markdown file is rendered into template.html and written next
to it as HTML. Finally every top-level HTML page gets its {{NAV}} filled
with links to the other pages.

Build layout:

  build/
  ├── template.html        # Shared template ({{CONTENT}}, {{NAV}}, {{key}})
  ├── index.md             # → index.html
  ├── about.md             # → about.html
  ├── links.html           # Static page, {{NAV}} resolved in place
  └── notes/draft.md       # Not top level: copied, never built

Macros:
  {{CONTENT}}   converted Markdown body (Markdown pages)
  {{key}}       first value of frontmatter key `key` (Markdown pages)
  {{NAV}}       list of links to the other HTML pages (all pages)

Unknown macros are left in place and reported as warnings.
Options go in mori.toml at the top of the source directory.")]
#[command(version)]
struct Cli {
    /// Source directory, copied into the build directory
    source: PathBuf,

    /// Build directory, must already exist
    build: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprint!("mori: {err}");
            std::process::exit(-1);
        }
    };

    if let Err(err) = run(&cli) {
        eprintln!("mori: {err}");
        std::process::exit(-1);
    }
}

fn run(cli: &Cli) -> Result<(), build::BuildError> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_build_event(&event);
        }
    });

    // The sender is dropped when the build returns, which ends the printer.
    let result = build::build_site(&cli.source, &cli.build, Some(tx));
    let _ = printer.join();

    output::print_summary(&result?);
    Ok(())
}
