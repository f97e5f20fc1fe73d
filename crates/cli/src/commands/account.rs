//! Account commands.

use secrecy::SecretString;
use shopfront_client::{Access, Route};

use super::{CommandError, Shell};

#[allow(clippy::print_stdout)]
pub async fn whoami() -> Result<(), CommandError> {
    let shell = Shell::logged_in().await?;
    let Some(identity) = shell.store.identity() else {
        return Err(CommandError::LoginRequired);
    };
    println!("{} <{}>", identity.full_name, identity.email);
    println!("username: {}", identity.username);
    println!("role:     {:?}", identity.role);
    println!(
        "cart:     {} items, {}",
        shell.store.cart().count(),
        shell.store.cart().total()
    );
    println!("wishlist: {} saved", shell.store.wishlist().count());
    Ok(())
}

pub async fn register(
    email: &str,
    username: &str,
    full_name: &str,
    password: String,
) -> Result<(), CommandError> {
    let mut shell = Shell::anonymous()?;
    let password = SecretString::from(password);
    let ok = shell
        .store
        .register(email, username, full_name, &password)
        .await;
    shell.ensure(ok, "register")
}

/// Print the guard decision for a path. Logs in only if credentials exist.
#[allow(clippy::print_stdout)]
pub async fn route(path: &str) -> Result<(), CommandError> {
    let shell = match Shell::logged_in().await {
        Ok(shell) => shell,
        Err(CommandError::LoginRequired) => Shell::anonymous()?,
        Err(err) => return Err(err),
    };
    let route = Route::from_path(path);
    match shell.store.authorize(&route) {
        Access::Allow => println!("{} -> allowed", route.path()),
        Access::Redirect(to) => println!("{} -> redirect to {}", route.path(), to.path()),
        Access::Forbidden => println!("{} -> forbidden", route.path()),
    }
    Ok(())
}
