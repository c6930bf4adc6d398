use anyhow::Result;
use vergen_gitcl::{BuildBuilder, Emitter, GitclBuilder, RustcBuilder};

/// Emits the values `vk info` prints.
fn main() -> Result<()> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let git = GitclBuilder::default().sha(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&git)?
        .add_instructions(&rustc)?
        .emit()?;
    Ok(())
}
