use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

// The blocking driver is produced from the async one so both share a single implementation.
// `src/async.rs` must therefore only mention the word in places where removing it is harmless.
fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/async.rs");
    let source = std::fs::read_to_string("src/async.rs")?;

    let blocking = source
        .replace("embedded_hal_async", "embedded_hal")
        .replace("async", "")
        .replace(".await", "");

    let mut out_path = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    out_path.push("blocking.rs");

    File::create(out_path)?.write_all(blocking.as_bytes())?;

    Ok(())
}
