use anyhow::Result;
use std::fs;

fn configure_memory_x(file: &str) {
    let filename = format!("memory/{}", file);

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed={}", &filename);

    fs::copy(&filename, "memory.x").unwrap();
}

#[cfg(feature = "stm32f446")]
fn main() -> Result<()> {
    configure_memory_x("nucleo_f446re.x");
    Ok(())
}

#[cfg(not(feature = "stm32f446"))]
fn main() -> Result<()> {
    // Nothing to configure when no target board is selected (host tooling).
    Ok(())
}
