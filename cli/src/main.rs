use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{ArgAction, Parser};
use flatjson::{
    JsonWriter, Markup, OutputOptions, ParseOptions, PathArg, Value, ValueTable,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "fjson", version, about = "Flat-table JSON parser and streaming generator")]
struct Args {
    /// Input file path (.json or .xml). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Treat the input as the XML rendition (overrides auto-detection).
    #[arg(long = "from-xml")]
    from_xml: bool,

    /// Emit the XML rendition instead of JSON.
    #[arg(short = 'x', long)]
    xml: bool,

    /// Print the value stored under this path instead of the document.
    #[arg(short, long, value_name = "path")]
    get: Option<String>,

    /// Substitution value for a %s/%d/%N placeholder in --get (repeatable, max 5).
    #[arg(long = "arg", value_name = "value")]
    substitutions: Vec<String>,

    /// Print the paths matching this wildcard pattern, one per line.
    #[arg(long, value_name = "pattern")]
    find: Option<String>,

    /// Subpath pattern appended to --find before matching.
    #[arg(long, value_name = "pattern", requires = "find")]
    subpath: Option<String>,

    /// Leaf value pattern a --find hit must also match.
    #[arg(long = "value", value_name = "pattern", requires = "find")]
    value_pattern: Option<String>,

    /// Indentation size (default: 2; 0 emits compact output).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Render through serde_json instead of the engine's seven-bit escaper.
    #[arg(long)]
    plain: bool,

    /// Accept lax input (unquoted scalars, trailing commas).
    #[arg(long = "no-strict", action = ArgAction::SetFalse, default_value_t = true)]
    strict: bool,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if args.substitutions.len() > 5 {
        return Err("at most 5 --arg values are supported".into());
    }
    let (input_text, input_source) = read_input(args.input.as_deref())?;
    let options = ParseOptions::new().with_strict(args.strict);

    let json_text = if input_is_xml(&args, &input_source) {
        let value = Markup::from(input_text.as_str()).to_value()?;
        serde_json::to_string(&value)?
    } else {
        input_text
    };

    if args.xml {
        let markup = flatjson::to_xml_with_options(&json_text, &options)?;
        return write_output(args.output.as_deref(), markup.to_string().as_bytes());
    }

    let table = flatjson::parse_with_options(&json_text, &options)?;

    if let Some(pattern) = &args.find {
        return run_find(&args, &table, pattern);
    }
    if let Some(path) = &args.get {
        let subs: Vec<PathArg> = args
            .substitutions
            .iter()
            .map(|value| PathArg::from(value.as_str()))
            .collect();
        return run_get(&args, &table, &flatjson::format_path(path, &subs));
    }
    write_document(&args, &table, ".")
}

fn run_find(args: &Args, table: &ValueTable, pattern: &str) -> Result<(), Box<dyn Error>> {
    let hits = table.find_paths_like(
        pattern,
        args.subpath.as_deref(),
        args.value_pattern.as_deref(),
    );
    let mut out = String::new();
    for hit in hits {
        out.push_str(&hit);
        out.push('\n');
    }
    write_output(args.output.as_deref(), out.as_bytes())
}

fn run_get(args: &Args, table: &ValueTable, path: &str) -> Result<(), Box<dyn Error>> {
    match table.get(path) {
        None => Err(format!("no value at path '{path}'").into()),
        Some(Value::Null) => write_output(args.output.as_deref(), b"null\n"),
        Some(value) if value.is_scalar() => {
            let text = table
                .get_string(path)?
                .unwrap_or_default();
            write_output(args.output.as_deref(), format!("{text}\n").as_bytes())
        }
        Some(_) => write_document(args, table, path),
    }
}

fn write_document(args: &Args, table: &ValueTable, path: &str) -> Result<(), Box<dyn Error>> {
    if args.plain {
        let value = table
            .to_value(path)
            .ok_or_else(|| format!("no value at path '{path}'"))?;
        return with_output_writer(args.output.as_deref(), |writer| {
            write_json(writer, &value, args.indent)
        });
    }
    with_output_writer(args.output.as_deref(), |out| {
        let options = OutputOptions::default()
            .with_emit_header(false)
            .with_indent(args.indent);
        let mut writer = JsonWriter::to_stream(out, options);
        writer.append_subtree(table, path)?;
        writer.into_stream()?;
        Ok(())
    })
}

fn input_is_xml(args: &Args, input_source: &InputSource) -> bool {
    if args.from_xml {
        return true;
    }
    match input_source {
        InputSource::Stdin => false,
        InputSource::File(path) => Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml")),
    }
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) if path != "-" => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    with_output_writer(path, |writer| {
        writer.write_all(data)?;
        Ok(())
    })
}

fn write_json(
    writer: &mut dyn Write,
    value: &serde_json::Value,
    indent: usize,
) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }
    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}
