use std::error::Error;

#[cfg(any(feature = "use-installed-tools", feature = "use-compiled-tools"))]
fn build_shader(path_to_crate: &str) -> Result<(), Box<dyn Error>> {
    use spirv_builder::{MetadataPrintout, SpirvBuilder};

    SpirvBuilder::new(path_to_crate, "spirv-unknown-vulkan1.1")
        .print_metadata(MetadataPrintout::Full)
        .build()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    #[cfg(any(feature = "use-installed-tools", feature = "use-compiled-tools"))]
    build_shader("shaders")?;
    Ok(())
}
