use static_huffman::fs::{compress_file, decompress_file};
use static_huffman::{Codec, CodecConfig, SymbolDomain};
use std::env;
use std::fs;
use std::process::ExitCode;

// the domain is not recorded in the compressed file, so it travels beside it
const CONFIG_PATH: &str = "encoded.cfg";

fn main() -> ExitCode {
    env_logger::init();

    let Some(fp) = env::args().nth(1) else {
        eprintln!("Please provide path to input file as first argument.");
        return ExitCode::FAILURE;
    };

    // any second argument switches to the full 8-bit symbol domain
    let domain = match env::args().nth(2) {
        Some(_) => SymbolDomain::Byte,
        None => SymbolDomain::Ascii,
    };

    // encode scope - save to file
    {
        let config = CodecConfig::new(domain);
        if let Err(e) = compress_file(&Codec::new(config), &fp, "encoded.huf") {
            eprintln!("compression failed: {e}");
            return ExitCode::FAILURE;
        }

        let saved = rmp_serde::to_vec(&config).map_err(|e| e.to_string());
        if let Err(e) = saved.and_then(|data| fs::write(CONFIG_PATH, data).map_err(|e| e.to_string())) {
            eprintln!("saving {CONFIG_PATH} failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    // decode scope - read from file
    {
        let loaded = fs::read(CONFIG_PATH)
            .map_err(|e| e.to_string())
            .and_then(|data| rmp_serde::from_slice::<CodecConfig>(&data).map_err(|e| e.to_string()));
        let config = match loaded {
            Ok(config) => config,
            Err(e) => {
                eprintln!("loading {CONFIG_PATH} failed: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Err(e) = decompress_file(&Codec::new(config), "encoded.huf", "decoded.txt") {
            eprintln!("decompression failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
