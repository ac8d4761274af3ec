use std::{env, fs, path::Path};

use fluid_tokens_core::bundled_tokens;

fn main() {
    let data = bundled_tokens().expect("bundled tokens are valid");

    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("tokens.css");
    fs::write(&dest_path, data.to_css().expect("bundled tokens render to CSS")).unwrap();
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../tokens");
}
