//! Command-line interface for compiling the language grammar.
//!
//! Builds the grammar with [`grammex_lang::build`] and writes the JSON
//! grammar descriptor a parser generator consumes, optionally together with
//! a plain-text listing of its rules, terminals and precedence levels.

#[cfg(feature = "cli")]
mod real {
    use anyhow::Context;
    use clap::Parser;
    use grammex::SynthConfig;
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(version, about = "Compile the language grammar into a parser-generator descriptor")]
    struct Args {
        /// Namespace the AST constructors live in
        #[arg(long, default_value = "yy")]
        namespace: String,

        /// Line-number variable available when a rule reduces
        #[arg(long, default_value = "yylineno")]
        line_var: String,

        /// Accept constructors missing from the registry
        #[arg(long)]
        unchecked: bool,

        /// Pretty-print the JSON descriptor
        #[arg(short, long)]
        pretty: bool,

        /// Path of the JSON descriptor (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path of an additional rule/terminal/operator listing
        #[arg(short, long)]
        listing: Option<PathBuf>,

        /// Enable debug logging (off by default).
        #[arg(short, long)]
        debug: bool,
    }

    pub fn main() -> anyhow::Result<()> {
        let args = Args::parse();

        let mut logger = env_logger::Builder::from_default_env();
        if args.debug {
            logger.filter_level(log::LevelFilter::Debug);
        }
        logger.init();

        let config = SynthConfig {
            namespace: args.namespace.as_str().into(),
            line_var: args.line_var.as_str().into(),
            ..SynthConfig::default()
        };
        let grammar =
            grammex_lang::build(config, !args.unchecked).context("can't compile grammar")?;

        let json = if args.pretty {
            grammar.to_json_pretty()?
        } else {
            grammar.to_json()?
        };
        match &args.output {
            Some(path) => std::fs::write(path, json + "\n")
                .with_context(|| format!("can't write {:?}", path))?,
            None => println!("{}", json),
        }

        if let Some(path) = &args.listing {
            let file = File::create(path).with_context(|| format!("can't create {:?}", path))?;
            let mut out = BufWriter::new(file);
            grammar.write_listing(&mut out)?;
            out.flush()?;
        }

        log::info!(
            "{} rules, {} terminals, start symbol {}",
            grammar.table().rule_count(),
            grammar.terminals().len(),
            grammar.start_symbol()
        );
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("grammex disabled (compiled without `cli` feature)");
}
