//! Renders markdown field documentation for a metadata model.
//!
//! Usage: `exifdata-docgen <exif|iptc|xmp> <template> <output> [schema]`
//!
//! The template's `{{fields}}` marker is replaced with one attribute table
//! per field. Without a schema path the bundled schema is documented.

use std::env;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

use exifdata::{Model, Standard, document, schema};
use tracing::{error, info};

const USAGE: &str = "usage: exifdata-docgen <exif|iptc|xmp> <template> <output> [schema]";

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [standard, template, output, rest @ ..] = args else {
        return Err(USAGE.into());
    };
    let standard = Standard::from_name(standard)
        .ok_or_else(|| format!("unknown metadata standard {:?}", standard))?;

    let model: Model = match rest {
        [] => schema::builtin(standard)?,
        [path] => schema::load(path, standard)?,
        _ => return Err(USAGE.into()),
    };

    let template = fs::read_to_string(template)?;
    let rendered = document::render(&template, &model);
    fs::write(output, &rendered)?;

    let fields = model.fields().count();
    info!(
        "Documented {} fields of the {} model in {}",
        fields,
        model.name(),
        output
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
