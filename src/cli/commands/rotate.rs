//! Rotation and credential command handlers

use chrono::Utc;

use crate::state::SharedState;

pub async fn cmd_rotate(state: &SharedState, name: &str) -> anyhow::Result<()> {
    let outcome = state.rotation.rotate(name).await?;
    println!(
        "✓ Rotated '{}' on target '{}' at {}",
        outcome.account,
        outcome.target,
        outcome.last_rotated.to_rfc3339()
    );
    println!("Use 'rotarr creds {}' to read the new password.", outcome.account);
    Ok(())
}

pub async fn cmd_creds(state: &SharedState, name: &str) -> anyhow::Result<()> {
    let creds = state.accounts.read_credentials(name).await?;
    println!("Username:      {}", creds.remote_username);
    println!("Password:      {}", creds.password);
    println!("Target:        {}", creds.target);
    println!("Last rotated:  {}", creds.last_rotated.to_rfc3339());
    Ok(())
}

pub async fn cmd_tick(state: &SharedState) -> anyhow::Result<()> {
    let report = state.auto_rotator.tick(Utc::now()).await;

    println!(
        "Scanned {} account(s), {} due, {} rotated, {} failed",
        report.scanned,
        report.due,
        report.rotated.len(),
        report.failed.len()
    );
    for name in &report.rotated {
        println!("  ✓ {}", name);
    }
    for name in &report.failed {
        println!("  ✗ {}", name);
    }
    Ok(())
}
