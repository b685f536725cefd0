//! Account command handlers

use crate::services::AccountUpdate;
use crate::state::SharedState;

pub async fn cmd_account_set(
    state: &SharedState,
    name: &str,
    update: AccountUpdate,
) -> anyhow::Result<()> {
    let view = state.accounts.upsert(name, update).await?;
    println!(
        "✓ Saved account '{}' ({}@{})",
        view.name, view.remote_username, view.target
    );
    if view.last_rotated.is_none() {
        println!("Run 'rotarr rotate {}' to set its first password.", view.name);
    }
    Ok(())
}

pub async fn cmd_account_get(state: &SharedState, name: &str) -> anyhow::Result<()> {
    let view = state.accounts.get(name).await?;

    println!("Account: {}", view.name);
    println!("{:-<60}", "");
    println!("Target:           {}", view.target);
    println!("Remote username:  {}", view.remote_username);
    println!(
        "Rotation period:  {}",
        if view.rotation_period_secs == 0 {
            "manual only".to_string()
        } else {
            format!("{}s", view.rotation_period_secs)
        }
    );
    println!("Password length:  {}", view.password_length);
    println!(
        "Last rotated:     {}",
        view.last_rotated
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
    );
    Ok(())
}

pub async fn cmd_account_list(state: &SharedState) -> anyhow::Result<()> {
    let names = state.accounts.list().await?;

    if names.is_empty() {
        println!("No accounts configured.");
        println!();
        println!("Add one with: rotarr account set <name> --target <target> --username <user>");
        return Ok(());
    }

    println!("Accounts ({} total)", names.len());
    println!("{:-<60}", "");
    for name in names {
        match state.accounts.get(&name).await {
            Ok(view) => println!(
                "• {} [{}@{}] last rotated: {}",
                view.name,
                view.remote_username,
                view.target,
                view.last_rotated
                    .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
            ),
            Err(e) => println!("• {} (error: {})", name, e),
        }
    }
    Ok(())
}

pub async fn cmd_account_delete(state: &SharedState, name: &str) -> anyhow::Result<()> {
    state.accounts.delete(name).await?;
    println!("✓ Deleted account '{}'", name);
    Ok(())
}
