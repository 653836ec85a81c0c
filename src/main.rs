use anyhow::{bail, Context};
use nodewire::{coerce, ResponseParser, WireConfig};
use std::fs::File;
use std::io::{self, Read};

const USAGE: &str = "usage: nodewire <content-type> [payload-file]";

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(content_type) = args.next() else {
        bail!(USAGE);
    };
    let config = match std::env::var_os("NODEWIRE_CONFIG") {
        Some(path) => WireConfig::from_yaml_file(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => WireConfig::default(),
    };

    let body: Box<dyn Read + Send> = match args.next() {
        Some(path) => Box::new(File::open(&path).with_context(|| format!("opening {}", path))?),
        None => Box::new(io::stdin()),
    };

    println!("nodewire v{}", nodewire::version());
    let mut response = ResponseParser::new(config).parse(&content_type, body)?;

    if let Some(value) = response.boolean() {
        println!("boolean: {}", value);
        return Ok(());
    }

    if let Some(columns) = response.columns() {
        let header: Vec<String> = columns
            .iter()
            .map(|c| format!("{} ({})", c.label(), c.type_name()))
            .collect();
        println!("{}", header.join("\t"));
    }

    let mut count = 0usize;
    if let Some(rows) = response.rows() {
        for row in rows {
            let row = row?;
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match coerce::to_string(cell.as_ref()) {
                    Ok(Some(text)) => text,
                    Ok(None) => "-".to_string(),
                    Err(e) => format!("<{}>", e),
                })
                .collect();
            println!("{}", cells.join("\t"));
            count += 1;
        }
    }
    println!("{} rows", count);
    response.close();
    Ok(())
}
