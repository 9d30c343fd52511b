use ucb_config::{ClearOutcome, TargetGroupRegistry, UpdateMode};

use crate::cli::{OutputFormat, RawListArgs, TargetGroupArgs, TargetIdsArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_raw_records, render_target_groups, render_target_ids};

pub(crate) fn handle_target_update(
    ctx: &mut AppContext,
    args: &TargetIdsArgs,
    mode: UpdateMode,
) -> CliResult<()> {
    let group = TargetGroupRegistry::new(&mut ctx.store).add_or_update_targets(
        &args.group,
        &args.ids,
        mode,
    )?;
    println!("{}: {}", group.name, group.targets.join(", "));
    Ok(())
}

pub(crate) fn handle_target_remove(ctx: &mut AppContext, args: &TargetGroupArgs) -> CliResult<()> {
    TargetGroupRegistry::new(&mut ctx.store).remove_group(&args.group)?;
    println!("Target group {} removed.", args.group);
    Ok(())
}

pub(crate) fn handle_target_clear(ctx: &mut AppContext, args: &TargetGroupArgs) -> CliResult<()> {
    match TargetGroupRegistry::new(&mut ctx.store).clear_group(&args.group)? {
        ClearOutcome::Cleared { group } => println!("Target group {group} cleared."),
        ClearOutcome::UnknownGroup { group } => eprintln!("No group: {group}"),
    }
    Ok(())
}

pub(crate) async fn handle_target_list(
    ctx: &mut AppContext,
    args: &RawListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let session = ctx.session()?;
    if args.raw {
        let records = session.list_build_target_records().await?;
        render_raw_records(&records)
    } else {
        let ids = session.list_build_targets().await?;
        render_target_ids(&ids, format)
    }
}

pub(crate) fn handle_target_show(ctx: &mut AppContext, format: OutputFormat) -> CliResult<()> {
    let groups = TargetGroupRegistry::new(&mut ctx.store).groups()?;
    render_target_groups(&groups, format)
}
