//! Cart inspection commands.

use group_order_core::{CartId, Identity, MemberId, build_badge, filter_for_viewer};
use group_order_server::db::{CartRepository, create_pool};

use super::{CommandError, database_url};

/// Print a cart's badge as JSON.
///
/// Without a member ID every item is counted; with one, only the items that
/// belong to that viewer.
///
/// # Errors
///
/// Returns error if the database is unreachable or the cart does not exist.
#[allow(clippy::print_stdout)]
pub async fn badge(
    cart_id: &str,
    member_id: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
) -> Result<(), CommandError> {
    let url = database_url()?;
    let pool = create_pool(&url).await?;
    let repo = CartRepository::new(&pool);

    let cart = repo
        .get(&CartId::new(cart_id))
        .await?
        .ok_or_else(|| CommandError::CartNotFound(cart_id.to_string()))?;
    let items = repo.items(&cart.id).await?;

    let viewer = member_id.map(MemberId::new);
    let identity =
        (email.is_some() || full_name.is_some()).then(|| Identity::new(email, full_name));
    let visible = filter_for_viewer(
        Some(items.as_slice()),
        viewer.as_ref(),
        identity.as_ref(),
        viewer.is_none(),
    );

    let badge = build_badge(&visible, Some(&cart.id), cart.name.as_deref());
    tracing::info!(cart_id = %cart.id, items = items.len(), "Cart loaded");
    println!("{}", serde_json::to_string_pretty(&badge)?);

    Ok(())
}
