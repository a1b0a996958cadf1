//! Viewer attribution for shared-cart line items.
//!
//! Matching follows a fixed trust order: structural identifiers first
//! (`addedByMemberId`, then assignee IDs), free-text fallbacks last (email,
//! then full name). The fallbacks exist for guests who were never issued an
//! ID. Two guests with the same name or email both match; there is no
//! collision resolution.

use std::borrow::Cow;

use super::line_item::{Identity, LineItem};
use crate::types::{MemberId, same_address};

/// Whether `item` belongs to the viewer.
///
/// Returns `false` when there is no viewer. The "extra" marker is never
/// matched by the email or name fallbacks.
#[must_use]
pub fn belongs_to(item: &LineItem, viewer: Option<&MemberId>, identity: Option<&Identity>) -> bool {
    let Some(viewer) = viewer.filter(|v| !v.as_str().trim().is_empty()) else {
        return false;
    };

    if item.added_by_member_id.as_ref() == Some(viewer) {
        return true;
    }

    if item
        .assigned_to
        .iter()
        .any(|assignee| assignee.id.as_ref() == Some(viewer))
    {
        return true;
    }

    let Some(identity) = identity else {
        return false;
    };
    let claimed = || item.assigned_to.iter().filter(|a| !a.is_extra());

    if let Some(email) = identity.email.as_deref()
        && claimed().any(|a| a.email.as_deref().is_some_and(|e| same_address(email, e)))
    {
        return true;
    }

    if let Some(full_name) = identity.full_name.as_deref()
        && claimed().any(|a| a.name.as_deref().is_some_and(|n| same_address(full_name, n)))
    {
        return true;
    }

    false
}

/// The items the viewer may see.
///
/// With `allow_all` the input slice is returned as-is (borrowed). Otherwise
/// the items matching [`belongs_to`] are returned in their original order.
/// A missing collection is treated as empty.
#[must_use]
pub fn filter_for_viewer<'a>(
    items: Option<&'a [LineItem]>,
    viewer: Option<&MemberId>,
    identity: Option<&Identity>,
    allow_all: bool,
) -> Cow<'a, [LineItem]> {
    let items = items.unwrap_or_default();
    if allow_all {
        return Cow::Borrowed(items);
    }

    Cow::Owned(
        items
            .iter()
            .filter(|item| belongs_to(item, viewer, identity))
            .cloned()
            .collect(),
    )
}
