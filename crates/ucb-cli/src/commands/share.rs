use ucb_cloud::{LinkSelector, ShareLinkService};

use crate::cli::{ShareCreateArgs, ShareDeleteArgs};
use crate::client::{AppContext, CliResult};

pub(crate) async fn handle_share_create(ctx: &mut AppContext, args: ShareCreateArgs) -> CliResult<()> {
    let session = ctx.session()?;
    let target_ids = ctx.resolve_group(&args.group)?;
    println!("create share link");
    let created = ShareLinkService::new(session)
        .create_links(
            &target_ids,
            &args.expiry,
            &LinkSelector::from_label(args.label),
        )
        .await?;
    println!("{created} share link(s) created, expiring {}", args.expiry);
    Ok(())
}

pub(crate) async fn handle_share_delete(ctx: &mut AppContext, args: ShareDeleteArgs) -> CliResult<()> {
    let session = ctx.session()?;
    let target_ids = ctx.resolve_group(&args.group)?;
    println!("delete share link");
    let deleted = ShareLinkService::new(session)
        .delete_links(&target_ids, &LinkSelector::from_label(args.label))
        .await?;
    println!("{deleted} share link(s) deleted");
    Ok(())
}
