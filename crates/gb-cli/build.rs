use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder()
        .build_timestamp()
        .rustc_semver()
        .cargo_target_triple()
        .emit()?;
    Ok(())
}
