use clap::{Parser, Subcommand};
use ime_core::dictionary::binary::BinaryDictionary;
use ime_core::persistence::{self, DictionaryHeader, DictionaryPayload};
use ime_core::{AssetAddress, ImeError, Locale};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Builds and inspects dictionary files.
#[derive(Parser, Debug)]
#[command(name = "dictionary_tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compiles a tab-separated word list into a dictionary file.
    ///
    /// Lines are `word<TAB>frequency[<TAB>offensive]`; bigram lines are
    /// `>previous word<TAB>frequency`. `#` starts a comment.
    Build {
        /// Word list to read.
        input: PathBuf,
        /// Dictionary file to write, e.g. main_en_US.dict.
        output: PathBuf,
        #[arg(long)]
        locale: String,
        #[arg(long, default_value = "main")]
        dict_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 1)]
        version: u32,
    },
    /// Packs several dictionary files into one and prints each address.
    Bundle {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Prints the header of a dictionary, optionally inside a bundle.
    Info {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 0)]
        length: u64,
    },
}

fn main() -> ime_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Args::parse().command {
        Command::Build { input, output, locale, dict_type, description, version } => {
            let text = fs::read_to_string(&input)?;
            let (words, bigrams) = persistence::parse_word_list(&text)?;
            let payload = DictionaryPayload {
                header: DictionaryHeader { locale: Locale::new(&locale), dict_type, description, version },
                words,
                bigrams,
            };
            persistence::save_dictionary(&output, &payload)?;
            info!(
                output = %output.display(),
                words = payload.words.len(),
                bigrams = payload.bigrams.len(),
                "dictionary written"
            );
        }
        Command::Bundle { output, inputs } => {
            let mut payloads = Vec::with_capacity(inputs.len());
            for input in &inputs {
                let address = AssetAddress::from_file(input).ok_or_else(|| not_a_file(input))?;
                payloads.push(persistence::load_payload(&address)?);
            }
            let addresses = persistence::save_bundle(&output, &payloads)?;
            for (input, address) in inputs.iter().zip(&addresses) {
                println!("{}\t{}\t{}", input.display(), address.offset(), address.length());
            }
        }
        Command::Info { file, offset, length } => {
            let name = file.to_string_lossy();
            let address = AssetAddress::from_file_name_and_offset(Some(name.as_ref()), offset, length)
                .ok_or_else(|| not_a_file(&file))?;
            let dict = BinaryDictionary::open(&address, false)?;
            let header = dict.header();
            println!("address:     {address}");
            println!("locale:      {}", header.locale);
            println!("type:        {}", header.dict_type);
            println!("description: {}", header.description);
            println!("version:     {}", header.version);
            println!("words:       {}", dict.word_count());
        }
    }
    Ok(())
}

fn not_a_file(path: &std::path::Path) -> ImeError {
    ImeError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} is not a file", path.display()),
    ))
}
