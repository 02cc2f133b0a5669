//! Session commands.

use pocket_bazaar_storefront::{Result, Storefront};

/// Sign in as `email`.
///
/// # Errors
///
/// Returns an error if the email is invalid or the session cannot be saved.
#[allow(clippy::print_stdout)]
pub fn login(shop: &Storefront, email: &str) -> Result<()> {
    let session = shop.login(email)?;
    println!("Logged in as {}", session.email);
    Ok(())
}

/// Sign out and empty the cart.
///
/// # Errors
///
/// Returns an error if the stored session or cart cannot be deleted.
#[allow(clippy::print_stdout)]
pub fn logout(shop: &Storefront) -> Result<()> {
    shop.logout()?;
    println!("Logged out");
    Ok(())
}

/// Print the signed-in shopper, if any.
#[allow(clippy::print_stdout)]
pub fn whoami(shop: &Storefront) {
    match shop.session().current() {
        Some(session) => println!(
            "{} (since {})",
            session.email,
            session.started_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("Not logged in"),
    }
}
