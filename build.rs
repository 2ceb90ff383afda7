//! Bundles `configs/<model>/parser.json` into `$OUT_DIR/parser_configs.json`, keyed by model name,
//! so `config::PARSER_CONFIGS` can inline the options of every parser at compile time.

use fs_err as fs;
use serde_json::{Map, Value};
use std::{io::BufWriter, path::Path};

fn read_parser_config(model_dir: &Path) -> Option<(String, Value)> {
    let model = model_dir.file_name()?.to_str()?.to_string();
    let config_path = model_dir.join("parser.json");
    println!("cargo:rerun-if-changed={}", config_path.display());

    let contents = fs::read_to_string(&config_path)
        .unwrap_or_else(|_| panic!("model '{}' has no readable parser.json", model));
    let config = serde_json::from_str(&contents)
        .unwrap_or_else(|_| panic!("parser.json of model '{}' is not valid json", model));
    Some((model, config))
}

fn main() {
    let configs_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
    let out_dir = std::env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    println!("cargo:rerun-if-changed={}", configs_dir.display());

    let mut model_dirs: Vec<_> = fs::read_dir(&configs_dir)
        .expect("configs directory is readable")
        .map(|entry| entry.expect("configs entry is readable").path())
        .filter(|path| path.is_dir())
        .collect();
    model_dirs.sort();

    let configs: Map<String, Value> = model_dirs
        .iter()
        .filter_map(|dir| read_parser_config(dir))
        .collect();

    let out = fs::File::create(Path::new(&out_dir).join("parser_configs.json"))
        .expect("parser_configs.json can be created in OUT_DIR");
    serde_json::to_writer_pretty(BufWriter::new(out), &Value::Object(configs))
        .expect("parser configs can be written");
}
