use eyre::WrapErr;
use opsgate_config::Config;
use std::io::Write;

pub fn execute(config: &Config, out: &mut impl Write) -> eyre::Result<()> {
    let rendered = serde_json::to_string_pretty(&config.redacted())
        .wrap_err("failed to render configuration")?;
    writeln!(out, "{rendered}")?;
    if config.security.signing_key.is_none() {
        writeln!(out, "warning: no signing key configured, tokens will not survive a restart")?;
    }
    Ok(())
}
