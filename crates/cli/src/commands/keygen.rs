use opsgate_security::generate_seed_hex;
use std::io::Write;

pub fn execute(out: &mut impl Write) -> eyre::Result<()> {
    let seed = generate_seed_hex();
    writeln!(out, "{}", seed.as_str())?;
    Ok(())
}
