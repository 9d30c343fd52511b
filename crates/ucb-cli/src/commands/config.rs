use crate::cli::ConfigSetArgs;
use crate::client::{AppContext, CliResult};
use crate::output::render_config_dump;

pub(crate) fn handle_config_set(ctx: &mut AppContext, args: &ConfigSetArgs) -> CliResult<()> {
    ctx.store.set(args.key.as_str(), args.value.trim())?;
    println!("{} updated.", args.key);
    Ok(())
}

pub(crate) fn handle_config_dump(ctx: &AppContext) -> CliResult<()> {
    let raw = ctx.store.dump()?;
    render_config_dump(ctx.store.path(), raw.as_deref());
    Ok(())
}
