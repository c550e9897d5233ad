//! hlstream - print the streaming highlight events for a file or stdin

mod cli;

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use hlstream::engine::tracing_emitter::TracingFactory;
use hlstream::engine::HighlightOptions;
use hlstream::{HighlightConfig, OperationLog, StreamingEmitter, StreamingHighlighter};

use cli::{CliArgs, OutputFormat};

/// Prints one line per event, indented by scope depth
struct TracePrinter<W: Write> {
    out: W,
    depth: usize,
    error: Option<io::Error>,
}

impl<W: Write> TracePrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            error: None,
        }
    }

    fn line(&mut self, event: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        let indent = self.depth * 2;
        if let Err(e) = writeln!(self.out, "{:indent$}{}", "", event, indent = indent) {
            self.error = Some(e);
        }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()
    }
}

impl<W: Write> StreamingEmitter for TracePrinter<W> {
    fn begin_scope(&mut self, name: &str) {
        self.line(format_args!("begin_scope {:?}", name));
        self.depth += 1;
    }

    fn end_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line(format_args!("end_scope"));
    }

    fn emit_text(&mut self, text: &str) {
        self.line(format_args!("emit_text {:?}", text));
    }

    fn begin_sublanguage(&mut self, name: &str) {
        self.line(format_args!("begin_sublanguage {:?}", name));
        self.depth += 1;
    }

    fn end_sublanguage(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line(format_args!("end_sublanguage"));
    }
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read stdin")?;
            Ok(code)
        }
    }
}

/// Run the engine with logging emitters only
fn trace_callbacks(
    highlighter: &StreamingHighlighter,
    code: &str,
    language: Option<&str>,
) -> Result<()> {
    let language = language.unwrap_or(highlighter.default_language());
    let options = HighlightOptions::new(language).ignore_illegals(true);
    let mut factory = TracingFactory::new();

    let result = highlighter.engine().highlight(code, &options, &mut factory)?;
    if let Some(err) = result.error_raised {
        return Err(err.context("Exception during highlighting"));
    }

    println!(
        "{} emitters created for {}; callbacks are logged at debug level (HLSTREAM_LOG=hlstream=debug)",
        factory.instance_count(),
        result.language
    );
    Ok(())
}

fn main() -> Result<()> {
    hlstream::tracing::init();

    let args = CliArgs::parse();
    let config = HighlightConfig::load();
    let mut highlighter = StreamingHighlighter::from_config(&config)?;
    if args.strict {
        highlighter.set_ignore_illegals(false);
    }

    if args.list_languages {
        for name in highlighter.languages() {
            println!("{}", name);
        }
        return Ok(());
    }

    let code = read_source(args.path.as_deref())?;
    let language = args.resolve_language();

    if args.trace_callbacks {
        return trace_callbacks(&highlighter, &code, language.as_deref());
    }

    match args.format {
        OutputFormat::Trace => {
            let stdout = io::stdout();
            let mut printer = TracePrinter::new(stdout.lock());
            highlighter.highlight(&code, language.as_deref(), &mut printer)?;
            printer.finish().context("Failed to write events")?;
        }
        OutputFormat::Json => {
            let mut log = OperationLog::new();
            highlighter.highlight(&code, language.as_deref(), &mut log)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &log).context("Failed to write events")?;
            writeln!(out)?;
        }
    }

    Ok(())
}
