#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "xsd2avro", about = "Convert XML Schema (XSD) to Avro")]
struct Cli {
    /// Path or URL to the XSD input
    #[arg(value_name = "XSD")]
    input: String,

    /// Path to the Avro schema output file
    #[arg(value_name = "AVSC")]
    output: String,

    /// XML instance to convert to an Avro data file
    #[arg(long)]
    xml: Option<String>,

    /// Output path for the Avro data file
    #[arg(long, requires = "xml")]
    data_out: Option<String>,
}

#[cfg(feature = "cli")]
fn main() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = xsd2avro::converter::convert_xsd_to_avro(&cli.input, &cli.output) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if let Some(xml) = &cli.xml {
        let data_out = cli
            .data_out
            .clone()
            .unwrap_or_else(|| format!("{xml}.avro"));
        if let Err(e) = xsd2avro::converter::convert_xml_to_avro(&cli.input, xml, &data_out) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary is only available with the `cli` feature enabled.");
    std::process::exit(1);
}
