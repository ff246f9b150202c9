use anyhow::{Result, anyhow};
use datahub_core::auth::UserProfile;
use datahub_core::error::DatahubError;

use super::AppContext;

/// Surfaces the message the store recorded rather than the raw error.
fn outcome<T>(ctx: &AppContext, result: std::result::Result<T, DatahubError>) -> Result<T> {
    result.map_err(|e| {
        let message = ctx.session.snapshot().error.unwrap_or_else(|| e.to_string());
        anyhow!(message)
    })
}

fn print_profile(profile: &UserProfile) {
    println!("{} (#{})", profile.username, profile.id);
    if let Some(email) = &profile.email {
        println!("  email: {}", email);
    }
    if let Some(phone) = &profile.phone_number {
        println!("  phone: {}", phone);
    }
    if let Some(role) = &profile.role {
        println!("  role:  {}", role);
    }
}

pub async fn login(ctx: &AppContext, username: &str, password: &str) -> Result<()> {
    outcome(ctx, ctx.session.login(username, password).await)?;
    println!("Logged in as {}", username);
    Ok(())
}

pub fn logout(ctx: &AppContext) {
    ctx.session.logout();
    println!("Logged out");
}

pub async fn register(
    ctx: &AppContext,
    username: &str,
    password: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<()> {
    outcome(ctx, ctx.session.register(username, password, email, phone).await)?;
    println!("Account {} created, you can now log in", username);
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let profile = outcome(ctx, ctx.session.fetch_profile().await)?;
    print_profile(&profile);
    Ok(())
}

pub async fn update_profile(
    ctx: &AppContext,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<()> {
    let profile = outcome(ctx, ctx.session.update_profile(email, phone).await)?;
    print_profile(&profile);
    Ok(())
}

pub async fn change_password(ctx: &AppContext, old: &str, new: &str) -> Result<()> {
    outcome(ctx, ctx.session.change_password(old, new).await)?;
    println!("Password changed");
    Ok(())
}

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    outcome(ctx, ctx.session.refresh().await)?;
    println!("Session refreshed");
    Ok(())
}
