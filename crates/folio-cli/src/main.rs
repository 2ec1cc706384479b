// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — report generation and PDF page operations from the command line.
//
// Entry point. Initialises logging, parses the command line, and dispatches
// to folio-document.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use folio_core::{FolioConfig, PaperSize, Result};
use folio_document::pdf::{self, PdfReader};
use folio_document::report::{ReportComposer, ReportDescription, ReportKind};

/// Sample description rendered by `folio demo`.
const DEMO_DESCRIPTION: &str = include_str!("../demos/annual_report.json");

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Compose styled PDF reports and work with existing PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report from a JSON description
    Report {
        /// Report description (JSON)
        #[arg(value_name = "FILE")]
        description: PathBuf,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Which parts of the description to include
        #[arg(long, value_enum, default_value = "full")]
        kind: KindArg,

        /// Configuration file (JSON)
        #[arg(long, value_name = "FILE", env = "FOLIO_CONFIG")]
        config: Option<PathBuf>,

        /// Paper size (a3, a4, a5, letter, legal, tabloid); overrides the config
        #[arg(long, value_parser = parse_paper)]
        paper: Option<PaperSize>,
    },

    /// Render the built-in sample report
    Demo {
        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show document information
    Info {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print extracted text
    Text {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only this page (1-based)
        #[arg(long)]
        page: Option<u32>,
    },

    /// Search page text with a regular expression
    Search {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Regular expression
        pattern: String,

        #[arg(long)]
        case_sensitive: bool,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Concatenate PDFs
    Merge {
        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Input PDFs, in order
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Split a PDF into chunks
    Split {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Pages per output file
        #[arg(long, default_value = "1")]
        chunk: u32,
    },

    /// Copy a page range into a new PDF
    Extract {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// First page (1-based)
        start: u32,

        /// Last page, clamped to the document length
        end: u32,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Rotate pages
    Rotate {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Clockwise rotation, a multiple of 90
        #[arg(long, default_value = "90", allow_hyphen_values = true)]
        degrees: i32,

        /// Pages to rotate (e.g. "1,3"); all pages when omitted
        #[arg(long, value_delimiter = ',')]
        pages: Option<Vec<u32>>,
    },

    /// Stamp the first page of another PDF over every page
    Watermark {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// PDF whose first page is the stamp
        #[arg(value_name = "STAMP")]
        watermark: PathBuf,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Password-protect a PDF (RC4, 128-bit)
    Encrypt {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Password needed to open the document
        #[arg(long, env = "FOLIO_USER_PASSWORD", hide_env_values = true)]
        user_password: String,

        /// Password for full access; defaults to the user password
        #[arg(long, env = "FOLIO_OWNER_PASSWORD", hide_env_values = true)]
        owner_password: Option<String>,
    },

    /// Remove password protection from a PDF
    Decrypt {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// User or owner password
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// Cover and text sections
    Text,
    /// Cover, intro and tables
    Table,
    /// Everything, with a banner cover and summary
    Full,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => ReportKind::Text,
            KindArg::Table => ReportKind::Table,
            KindArg::Full => ReportKind::Full,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Report {
            description,
            output,
            kind,
            config,
            paper,
        } => {
            let mut config = match config {
                Some(path) => FolioConfig::load(path)?,
                None => FolioConfig::default(),
            };
            if let Some(paper) = paper {
                config.default_paper_size = paper;
            }
            let desc = load_description(&description)?;
            let path = ReportComposer::with_config(&desc, config).generate(kind.into(), &output)?;
            println!("{}", path.display());
        }

        Commands::Demo { output } => {
            let desc = ReportDescription::from_json(DEMO_DESCRIPTION)?;
            let path = ReportComposer::new(&desc).generate(ReportKind::Full, &output)?;
            println!("{}", path.display());
        }

        Commands::Info { input, json } => {
            let info = PdfReader::open(&input)?.info();
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let or_none = |s: &str| if s.is_empty() { "(none)".to_string() } else { s.to_string() };
                println!("Pages     : {}", info.num_pages);
                println!("Size      : {} KB", info.file_size_kb);
                println!("Encrypted : {}", info.encrypted);
                println!("Title     : {}", or_none(&info.title));
                println!("Author    : {}", or_none(&info.author));
                println!("Subject   : {}", or_none(&info.subject));
                println!("Creator   : {}", or_none(&info.creator));
                println!("Producer  : {}", or_none(&info.producer));
                println!("Created   : {}", or_none(&info.creation_date));
            }
        }

        Commands::Text { input, page } => {
            let reader = PdfReader::open(&input)?;
            let text = match page {
                Some(n) => reader.extract_page_text(n)?,
                None => reader.extract_text(),
            };
            println!("{text}");
        }

        Commands::Search {
            input,
            pattern,
            case_sensitive,
            json,
        } => {
            let matches = PdfReader::open(&input)?.search(&pattern, case_sensitive)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for m in &matches {
                    println!("p{} l{}: {}  [{}]", m.page, m.line_number, m.line, m.matched);
                }
                println!("{} match(es)", matches.len());
            }
        }

        Commands::Merge { output, inputs } => {
            let total = pdf::merge_files(inputs.as_slice(), &output)?;
            println!("{} ({total} pages)", output.display());
        }

        Commands::Split {
            input,
            output,
            chunk,
        } => {
            for path in pdf::split_file(&input, &output, chunk)? {
                println!("{}", path.display());
            }
        }

        Commands::Extract {
            input,
            start,
            end,
            output,
        } => {
            let path = pdf::extract_range_file(&input, start, end, &output)?;
            println!("{}", path.display());
        }

        Commands::Rotate {
            input,
            output,
            degrees,
            pages,
        } => {
            let path = pdf::rotate_file(&input, &output, degrees, pages.as_deref())?;
            println!("{}", path.display());
        }

        Commands::Watermark {
            input,
            watermark,
            output,
        } => {
            let path = pdf::watermark_file(&input, &watermark, &output)?;
            println!("{}", path.display());
        }

        Commands::Encrypt {
            input,
            output,
            user_password,
            owner_password,
        } => {
            let path =
                pdf::encrypt_file(&input, &output, &user_password, owner_password.as_deref())?;
            println!("{}", path.display());
        }

        Commands::Decrypt {
            input,
            output,
            password,
        } => {
            let path = pdf::decrypt_file(&input, &output, &password)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn parse_paper(value: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_keyword(value).ok_or_else(|| {
        format!("unknown paper size '{value}' (expected a3, a4, a5, letter, legal or tabloid)")
    })
}

fn load_description(path: &Path) -> Result<ReportDescription> {
    if !path.exists() {
        return Err(folio_core::FolioError::NotFound(path.to_path_buf()));
    }
    ReportDescription::from_json(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn demo_description_parses() {
        let desc = ReportDescription::from_json(DEMO_DESCRIPTION).unwrap();
        assert_eq!(desc.sections.len(), 4);
        assert_eq!(desc.tables.len(), 2);
        assert!(!desc.sections[2].is_primary());
        assert_eq!(desc.tables[1].rows[3][1].as_str(), "");
    }

    #[test]
    fn rotate_pages_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "folio", "rotate", "in.pdf", "-o", "out.pdf", "--degrees", "-90", "--pages", "1,3",
        ])
        .unwrap();
        match cli.command {
            Commands::Rotate { degrees, pages, .. } => {
                assert_eq!(degrees, -90);
                assert_eq!(pages, Some(vec![1, 3]));
            }
            _ => panic!("expected rotate"),
        }
    }

    #[test]
    fn demo_renders_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("demo.pdf");
        run(Commands::Demo { output: out.clone() }).unwrap();

        let reader = PdfReader::open(&out).unwrap();
        assert!(reader.page_count() >= 2);
    }

    #[test]
    fn missing_description_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(Commands::Report {
            description: dir.path().join("absent.json"),
            output: dir.path().join("out.pdf"),
            kind: KindArg::Text,
            config: None,
            paper: None,
        });
        assert!(matches!(result, Err(folio_core::FolioError::NotFound(_))));
    }

    #[test]
    fn paper_option_accepts_keywords() {
        let cli = Cli::try_parse_from([
            "folio", "report", "in.json", "-o", "out.pdf", "--paper", "Letter",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { paper, .. } => assert_eq!(paper, Some(PaperSize::Letter)),
            _ => panic!("expected report"),
        }

        assert!(
            Cli::try_parse_from(["folio", "report", "in.json", "-o", "out.pdf", "--paper", "b5"])
                .is_err()
        );
    }

    #[test]
    fn paper_option_sets_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let description = dir.path().join("report.json");
        std::fs::write(&description, r#"{"title": "Sized"}"#).unwrap();
        let out = dir.path().join("letter.pdf");

        run(Commands::Report {
            description,
            output: out.clone(),
            kind: KindArg::Text,
            config: None,
            paper: Some(PaperSize::Letter),
        })
        .unwrap();

        let doc = lopdf::Document::load(&out).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 612.0).abs() < 1.0);
        assert!((height - 792.0).abs() < 1.0);
    }

    #[test]
    fn encrypt_and_decrypt_subcommands() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.pdf");
        run(Commands::Demo {
            output: plain.clone(),
        })
        .unwrap();

        let cli = Cli::try_parse_from([
            "folio",
            "encrypt",
            plain.to_str().unwrap(),
            "-o",
            dir.path().join("locked.pdf").to_str().unwrap(),
            "--user-password",
            "test123",
        ])
        .unwrap();
        run(cli.command).unwrap();
        let locked = dir.path().join("locked.pdf");
        assert!(PdfReader::open(&locked).unwrap().info().encrypted);

        let wrong = run(Commands::Decrypt {
            input: locked.clone(),
            output: dir.path().join("bad.pdf"),
            password: "wrong".to_string(),
        });
        assert!(matches!(wrong, Err(folio_core::FolioError::InvalidPassword)));

        let unlocked = dir.path().join("unlocked.pdf");
        run(Commands::Decrypt {
            input: locked,
            output: unlocked.clone(),
            password: "test123".to_string(),
        })
        .unwrap();
        let reader = PdfReader::open(&unlocked).unwrap();
        assert!(!reader.info().encrypted);
        assert_eq!(
            reader.page_count(),
            PdfReader::open(&plain).unwrap().page_count()
        );
    }

    #[test]
    fn watermark_subcommand_keeps_pages() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.pdf");
        run(Commands::Demo {
            output: plain.clone(),
        })
        .unwrap();
        let stamped = dir.path().join("stamped.pdf");

        run(Commands::Watermark {
            input: plain.clone(),
            watermark: plain.clone(),
            output: stamped.clone(),
        })
        .unwrap();
        assert_eq!(
            PdfReader::open(&stamped).unwrap().page_count(),
            PdfReader::open(&plain).unwrap().page_count()
        );
    }
}
