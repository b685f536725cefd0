//! Target command handlers

use crate::services::TargetUpdate;
use crate::state::SharedState;

pub async fn cmd_target_set(
    state: &SharedState,
    name: &str,
    update: TargetUpdate,
) -> anyhow::Result<()> {
    let view = state.targets.upsert(name, update).await?;
    println!("✓ Saved target '{}' ({})", view.name, view.semp_url);
    Ok(())
}

pub async fn cmd_target_get(state: &SharedState, name: &str) -> anyhow::Result<()> {
    let view = state.targets.get(name).await?;

    println!("Target: {}", view.name);
    println!("{:-<60}", "");
    println!("SEMP URL:        {}", view.semp_url);
    println!("Admin username:  {}", view.admin_username);
    println!(
        "SEMP version:    {}",
        view.semp_version.as_deref().unwrap_or("(none)")
    );
    println!(
        "TLS verify:      {}",
        if view.tls_skip_verify { "No" } else { "Yes" }
    );
    Ok(())
}

pub async fn cmd_target_list(state: &SharedState) -> anyhow::Result<()> {
    let names = state.targets.list().await?;

    if names.is_empty() {
        println!("No targets configured.");
        println!();
        println!("Add one with: rotarr target set <name> --url <url> --username <user> --password <pass>");
        return Ok(());
    }

    println!("Targets ({} total)", names.len());
    println!("{:-<60}", "");
    for name in names {
        println!("• {}", name);
    }
    Ok(())
}

pub async fn cmd_target_delete(state: &SharedState, name: &str) -> anyhow::Result<()> {
    state.targets.delete(name).await?;
    println!("✓ Deleted target '{}'", name);
    Ok(())
}
